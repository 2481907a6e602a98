use axum::{
	body::{Bytes, HttpBody},
	extract::FromRequest,
	http::{header, Request},
	BoxError,
};
use serde::de::DeserializeOwned;

use super::has_form_content_type;
use crate::{models::AccessTokenData, prelude::*};

/// Extracts a form-encoded protocol body together with the claims of the
/// bearer token that must accompany it. Used by the registration endpoints.
///
/// Checks run in protocol order: request shape, then token presence, then
/// token validity, then the body. A missing Authorization header is its own
/// reportable condition, distinct from a malformed token, and is logged as
/// an error since it indicates either a client bug or an attack attempt.
pub struct AuthenticatedForm<T> {
	/// The validated claims of the presented bearer token
	pub claims: AccessTokenData,
	/// The decoded request body
	pub body: T,
}

#[axum::async_trait]
impl<B, T> FromRequest<App, B> for AuthenticatedForm<T>
where
	B: HttpBody + Send + 'static,
	B::Data: Send,
	B::Error: Into<BoxError>,
	T: DeserializeOwned,
{
	type Rejection = ErrorType;

	async fn from_request(req: Request<B>, state: &App) -> Result<Self, Self::Rejection> {
		if !has_form_content_type(req.headers()) {
			debug!("Rejecting request without a form-encoded body");
			return Err(ErrorType::UnsupportedContentType);
		}

		let Some(authorization) = req.headers().get(header::AUTHORIZATION) else {
			error!("No bearer token found on a registration request");
			return Err(ErrorType::MissingAuthenticationToken);
		};

		let token = authorization
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix("Bearer "))
			.ok_or_else(|| {
				error!("Authorization header is not a bearer credential");
				ErrorType::MalformedAccessToken
			})?
			.trim()
			.to_string();

		let claims = AccessTokenData::parse(&token, &state.config.jwt)?;

		let bytes = Bytes::from_request(req, state)
			.await
			.map_err(|_| ErrorType::WrongParameters)?;

		let body = serde_urlencoded::from_bytes(&bytes).map_err(|err| {
			debug!("Failed to decode form body: {err}");
			ErrorType::WrongParameters
		})?;

		Ok(Self { claims, body })
	}
}
