use serde::{Deserialize, Serialize};

/// Route to initiate device registration: `POST
/// /auth/device/init-registration`, form-encoded, bearer token required.
///
/// On success an OTP challenge is sent to the caller's verified phone number
/// (unless the session satisfies the configured skip condition) and the
/// device row is created in a pending, untrusted state. No ownership is
/// committed until the completion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitDeviceRegistrationRequest {
	/// The client-generated device identifier
	pub device_id: String,
	/// The platform the device runs on (`android`, `ios`, `web`, ...)
	pub platform: String,
	/// User-visible device name
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Hardware model
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	/// Operating system version
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub os_version: Option<String>,
	/// Space-delimited scopes requested for the eventual device grant. Must
	/// be a subset of what the presented access token is granted
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}

/// How the initiation step concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceChallengeStatus {
	/// A one-time password was sent to the caller's verified phone number
	OtpSent,
	/// The session already satisfies the configured skip condition; no code
	/// was sent and completion may be called without one
	OtpSkipped,
}

/// The continuation payload returned by a successful initiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitDeviceRegistrationResponse {
	/// The device identifier the challenge is bound to
	pub device_id: String,
	/// Whether a code was sent or the challenge was skipped
	pub status: DeviceChallengeStatus,
}
