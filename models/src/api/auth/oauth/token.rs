use serde::{Deserialize, Serialize};

use crate::utils::Base64String;

/// The grant type string under which a trusted device exchanges its bound
/// credential for tokens
pub const DEVICE_AUTHENTICATION_GRANT_TYPE: &str = "device_authentication";

/// The request body for the token endpoint: `POST /auth/oauth/token`,
/// form-encoded, no bearer token (this is a login operation, not an
/// authenticated-user action).
///
/// `grant_type` is kept as a plain string so that an unknown value can be
/// reported as `unsupported_grant_type` rather than a parse failure. The
/// remaining fields are optional at the serde level and validated by the
/// handler, since which of them are required depends on the grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
	/// The grant type for the request
	pub grant_type: String,
	/// The registered device identifier (device-authentication grant)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub device_id: Option<String>,
	/// Ed25519 signature over `{device_id}.{signed_at}`, base64 (device-
	/// authentication grant)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<Base64String>,
	/// The unix timestamp the assertion was signed at. Rejected outside the
	/// configured freshness window (device-authentication grant)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signed_at: Option<i64>,
}

/// The standard token response returned on a successful grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// The access token that authenticates the device's owner
	pub access_token: String,
	/// Always `Bearer`
	pub token_type: String,
	/// The time in seconds that the access token is valid for
	pub expires_in: u64,
	/// The refresh token used to renew the access token
	pub refresh_token: String,
}
