use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::utils::Base64String;

/// Route to finalize device registration: `POST
/// /auth/device/complete-registration`, form-encoded, bearer token required
/// (and it must belong to the user who initiated).
///
/// The submitted code is verified against the challenge issued during
/// initiation; challenges are single-use, so calling this twice with the
/// same code fails the second time. On success the device is claimed for the
/// calling user and marked trusted, and the uploaded public key becomes the
/// device's credential for the device-authentication grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteDeviceRegistrationRequest {
	/// The client-generated device identifier
	pub device_id: String,
	/// The one-time password delivered during initiation. May only be
	/// omitted when the session satisfies the configured skip condition
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub otp: Option<String>,
	/// The device's Ed25519 verifying key (32 bytes, base64)
	pub public_key: Base64String,
}

/// The confirmation payload returned by a successful completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteDeviceRegistrationResponse {
	/// The device identifier that was registered
	pub device_id: String,
	/// Always true on success; echoed for client convenience
	pub trusted: bool,
	/// When trust became effective
	#[serde(with = "time::serde::rfc3339")]
	pub trust_activation_date: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_from_a_form_body() {
		let request = serde_urlencoded::from_str::<CompleteDeviceRegistrationRequest>(
			"device_id=dev-1&otp=123456&public_key=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA%3D",
		)
		.unwrap();
		assert_eq!(request.device_id, "dev-1");
		assert_eq!(request.otp.as_deref(), Some("123456"));
		assert_eq!(request.public_key.len(), 32);
	}

	#[test]
	fn otp_is_optional() {
		let request = serde_urlencoded::from_str::<CompleteDeviceRegistrationRequest>(
			"device_id=dev-1&public_key=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA%3D",
		)
		.unwrap();
		assert_eq!(request.otp, None);
	}
}
