use axum::{
	body::{Bytes, HttpBody},
	extract::FromRequest,
	http::Request,
	BoxError,
};
use serde::de::DeserializeOwned;

use super::has_form_content_type;
use crate::prelude::*;

/// Extracts a form-encoded protocol body without any bearer credential.
/// Used by the token endpoint, which replaces password login and therefore
/// carries no authenticated user.
///
/// Anything that is not `application/x-www-form-urlencoded` is rejected as
/// `invalid_request` before the body is read.
pub struct ProtocolForm<T>(pub T);

#[axum::async_trait]
impl<S, B, T> FromRequest<S, B> for ProtocolForm<T>
where
	B: HttpBody + Send + 'static,
	B::Data: Send,
	B::Error: Into<BoxError>,
	S: Send + Sync,
	T: DeserializeOwned,
{
	type Rejection = ErrorType;

	async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
		if !has_form_content_type(req.headers()) {
			debug!("Rejecting request without a form-encoded body");
			return Err(ErrorType::UnsupportedContentType);
		}

		let bytes = Bytes::from_request(req, state)
			.await
			.map_err(|_| ErrorType::WrongParameters)?;

		serde_urlencoded::from_bytes(&bytes).map(Self).map_err(|err| {
			debug!("Failed to decode form body: {err}");
			ErrorType::WrongParameters
		})
	}
}
