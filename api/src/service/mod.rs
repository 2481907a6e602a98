//! Business services behind the route handlers: the device store
//! abstraction, the OTP challenge issuer, token issuance, device credential
//! verification and the registration policy predicates

mod credential;
mod device_store;
mod otp;
mod policy;
mod token;

pub use self::{
	credential::{assertion_message, validate_public_key, verify_device_assertion},
	device_store::{DeviceTrustEvent, NotifyingDeviceStore, UserDeviceStore},
	otp::{challenge_purpose, HttpOtpIssuer, OtpChallengeIssuer},
	policy::{session_skips_otp, validate_registration_request},
	token::TokenIssuer,
};
