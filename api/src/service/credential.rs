use ed25519_dalek::{Signature, VerifyingKey};
use time::OffsetDateTime;

use crate::prelude::*;

/// The canonical byte string a device signs when authenticating: the device
/// identifier and the signing timestamp, joined with a dot. Binding the
/// timestamp into the message bounds how long a captured assertion can be
/// replayed
pub fn assertion_message(device_id: &str, signed_at: i64) -> String {
	format!("{device_id}.{signed_at}")
}

/// Checks that an uploaded public key is a well-formed Ed25519 verifying
/// key before it is stored as a device credential. Rejected keys are a
/// client bug, so this is `invalid_request`, not a grant failure
pub fn validate_public_key(bytes: &[u8]) -> Result<(), ErrorType> {
	let key_bytes = <&[u8; constants::DEVICE_PUBLIC_KEY_LENGTH]>::try_from(bytes).map_err(|_| {
		debug!("Uploaded public key has length {}", bytes.len());
		ErrorType::WrongParameters
	})?;
	VerifyingKey::from_bytes(key_bytes).map_err(|_| {
		debug!("Uploaded public key is not a valid Ed25519 key");
		ErrorType::WrongParameters
	})?;

	Ok(())
}

/// Verifies the signed assertion a device presents at the token endpoint
/// against its stored verifying key.
///
/// Every failure maps to the same generic
/// [`ErrorType::InvalidDeviceCredentials`] so the caller learns nothing
/// about why; the specific reason goes to the log.
pub fn verify_device_assertion(
	device: &UserDevice,
	signed_at: i64,
	signature: &[u8],
	now: OffsetDateTime,
	max_age_secs: i64,
) -> Result<(), ErrorType> {
	// `signed_at` is caller-controlled and may sit anywhere in the i64
	// range, so the arithmetic must not overflow
	let age = now.unix_timestamp().saturating_sub(signed_at);
	if !(-max_age_secs..=max_age_secs).contains(&age) {
		info!(
			"Assertion for device `{}` is outside the freshness window ({age}s)",
			device.device_id,
		);
		return Err(ErrorType::InvalidDeviceCredentials);
	}

	let Some(public_key) = &device.public_key else {
		warn!("Trusted device `{}` has no stored public key", device.device_id);
		return Err(ErrorType::InvalidDeviceCredentials);
	};

	let key_bytes = <&[u8; constants::DEVICE_PUBLIC_KEY_LENGTH]>::try_from(public_key.as_bytes()).map_err(|_| {
		warn!("Stored public key for device `{}` has the wrong length", device.device_id);
		ErrorType::InvalidDeviceCredentials
	})?;
	let verifying_key = VerifyingKey::from_bytes(key_bytes).map_err(|_| {
		warn!("Stored public key for device `{}` is not a valid key", device.device_id);
		ErrorType::InvalidDeviceCredentials
	})?;

	let signature = Signature::from_slice(signature).map_err(|_| {
		info!("Assertion for device `{}` has a malformed signature", device.device_id);
		ErrorType::InvalidDeviceCredentials
	})?;

	let message = assertion_message(&device.device_id, signed_at);
	verifying_key.verify_strict(message.as_bytes(), &signature).map_err(|_| {
		info!("Assertion signature for device `{}` did not verify", device.device_id);
		ErrorType::InvalidDeviceCredentials
	})
}
