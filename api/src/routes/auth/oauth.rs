use axum::{extract::State, routing::post, Json, Router};
use time::OffsetDateTime;

use crate::{prelude::*, service, utils::extractors::ProtocolForm};

/// Creates the router for the token endpoint
pub(super) fn create_sub_app() -> Router<App> {
	Router::new().route("/auth/oauth/token", post(token))
}

/// The token endpoint, handling the device-authentication grant: a trusted
/// device exchanges its bound credential for tokens, with no end-user
/// bearer token involved.
///
/// Every business failure past parameter validation collapses onto a
/// generic `invalid_grant` so a caller cannot probe which device
/// identifiers exist or in what state they are; the log records the real
/// reason
async fn token(
	State(app): State<App>,
	ProtocolForm(body): ProtocolForm<TokenRequest>,
) -> Result<Json<TokenResponse>, ErrorType> {
	if body.grant_type != DEVICE_AUTHENTICATION_GRANT_TYPE {
		debug!("Unsupported grant type `{}` requested", body.grant_type);
		return Err(ErrorType::UnsupportedGrantType);
	}

	let (Some(device_id), Some(signature), Some(signed_at)) =
		(body.device_id, body.signature, body.signed_at)
	else {
		debug!("Device grant request is missing required parameters");
		return Err(ErrorType::WrongParameters);
	};

	info!("Device authentication grant requested for device `{device_id}`");

	let Some(device) = app.devices.get_by_device_id(&device_id).await? else {
		info!("Grant attempted for unknown device `{device_id}`");
		return Err(ErrorType::InvalidDeviceCredentials);
	};

	if device.blocked {
		info!("Grant attempted for blocked device `{device_id}`");
		return Err(ErrorType::InvalidDeviceCredentials);
	}

	if !device.is_trusted {
		info!("Grant attempted for untrusted device `{device_id}`");
		return Err(ErrorType::InvalidDeviceCredentials);
	}

	if device.requires_password {
		info!("Device `{device_id}` may not bypass password login");
		return Err(ErrorType::InvalidDeviceCredentials);
	}

	let Some(owner) = device.owner_user_id else {
		warn!("Trusted device `{device_id}` has no owner");
		return Err(ErrorType::InvalidDeviceCredentials);
	};

	let now = OffsetDateTime::now_utc();
	service::verify_device_assertion(
		&device,
		signed_at,
		signature.as_bytes(),
		now,
		app.config.device.assertion_max_age_secs,
	)?;

	let mfa_session_active = device
		.mfa_session_expiration_date
		.map(|expiry| expiry > now)
		.unwrap_or(false);

	let response = app.tokens.issue_device_tokens(&owner, &device_id, mfa_session_active, now)?;

	info!("Issued tokens for user `{owner}` through device `{device_id}`");

	Ok(Json(response))
}
