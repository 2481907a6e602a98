use std::ops::Add;

use axum::{extract::State, routing::post, Json, Router};
use time::OffsetDateTime;

use crate::{prelude::*, service, utils::extractors::AuthenticatedForm};

/// Creates the router for the device registration endpoints
pub(super) fn create_sub_app() -> Router<App> {
	Router::new()
		.route("/auth/device/init-registration", post(init_registration))
		.route("/auth/device/complete-registration", post(complete_registration))
}

/// Initiates device registration for the authenticated user: enforces the
/// ownership and phone-verification prerequisites, persists the device in
/// its pending state, and triggers the OTP challenge. Ownership itself is
/// checked here but only committed by the completion step
async fn init_registration(
	State(app): State<App>,
	AuthenticatedForm { claims, body }: AuthenticatedForm<InitDeviceRegistrationRequest>,
) -> Result<Json<InitDeviceRegistrationResponse>, ErrorType> {
	let InitDeviceRegistrationRequest {
		device_id,
		platform,
		name,
		model,
		os_version,
		scope,
	} = body;

	info!("Initiating registration for device `{device_id}`");

	service::validate_registration_request(&claims, &app.config.device, scope.as_deref())?;

	if let Some(existing) = app.devices.get_by_device_id(&device_id).await? {
		if !existing.registrable_by(&claims.sub) {
			warn!(
				"User `{}` attempted to register device `{device_id}`, which belongs to another user",
				claims.sub,
			);
			return Err(ErrorType::DeviceOwnedByAnotherUser);
		}
	}

	let Some(phone_number) = claims.verified_phone_number() else {
		info!("User `{}` has no verified phone number on their token", claims.sub);
		return Err(ErrorType::PhoneNumberNotVerified);
	};

	let device = UserDevice {
		name,
		model,
		os_version,
		..UserDevice::pending(device_id.clone(), platform)
	};
	app.devices.register_pending(&device, &claims.sub).await?;

	let status = if service::session_skips_otp(&claims, &app.config.device) {
		debug!("Session for user `{}` satisfies the skip-OTP condition", claims.sub);
		DeviceChallengeStatus::OtpSkipped
	} else {
		let purpose = service::challenge_purpose(&claims.sub, &device_id);
		app.otp.send(&purpose, phone_number).await?;
		DeviceChallengeStatus::OtpSent
	};

	Ok(Json(InitDeviceRegistrationResponse { device_id, status }))
}

/// Finalizes device registration: verifies the one-time password against
/// the challenge purpose, then atomically claims the device for the caller
/// and marks it trusted with the uploaded public key as its credential
async fn complete_registration(
	State(app): State<App>,
	AuthenticatedForm { claims, body }: AuthenticatedForm<CompleteDeviceRegistrationRequest>,
) -> Result<Json<CompleteDeviceRegistrationResponse>, ErrorType> {
	let CompleteDeviceRegistrationRequest {
		device_id,
		otp,
		public_key,
	} = body;

	info!("Completing registration for device `{device_id}`");

	// Authorization was established at initiation; the challenge (or the
	// skip predicate) is the proof that carries over to this step
	service::validate_public_key(public_key.as_bytes())?;

	if !service::session_skips_otp(&claims, &app.config.device) {
		let otp = otp.ok_or_else(|| {
			debug!("No verification code submitted for device `{device_id}`");
			ErrorType::WrongParameters
		})?;

		let purpose = service::challenge_purpose(&claims.sub, &device_id);
		if !app.otp.verify(&purpose, &otp).await? {
			info!("Verification code for `{purpose}` did not verify");
			return Err(ErrorType::OtpVerificationFailed);
		}
	}

	let now = OffsetDateTime::now_utc();
	let device = app
		.devices
		.finalize_trust(
			&device_id,
			&claims.sub,
			public_key.as_bytes(),
			now,
			now.add(constants::MFA_SESSION_VALIDITY),
		)
		.await
		.inspect_err(|err| {
			// Covers the race where a competing registration for the same
			// device completed between initiation and this call
			if *err == ErrorType::DeviceOwnedByAnotherUser {
				warn!(
					"User `{}` lost the registration race for device `{device_id}`",
					claims.sub,
				);
			}
		})?;

	Ok(Json(CompleteDeviceRegistrationResponse {
		device_id: device.device_id,
		trusted: device.is_trusted,
		trust_activation_date: device.trust_activation_date.unwrap_or(now),
	}))
}
