//! Request extractors for the protocol endpoints.
//!
//! The endpoints speak the OAuth2 wire shape, which means validation has a
//! fixed order: request shape first (`invalid_request`), then the bearer
//! credential (`invalid_token`), then the body. Running those checks inside
//! one extractor keeps the order in one place instead of depending on
//! axum's extractor evaluation order.

mod authenticated_form;
mod protocol_form;

pub use self::{authenticated_form::AuthenticatedForm, protocol_form::ProtocolForm};

use axum::http::{header, HeaderMap};

/// Whether the request declares a form-encoded body. Parameters such as a
/// charset are tolerated; any other media type is rejected before business
/// logic runs
pub(crate) fn has_form_content_type(headers: &HeaderMap) -> bool {
	headers
		.get(header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(|value| {
			value
				.split(';')
				.next()
				.unwrap_or_default()
				.trim()
				.eq_ignore_ascii_case("application/x-www-form-urlencoded")
		})
		.unwrap_or(false)
}
