#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Shared API contract for the device-bound authentication service.
//!
//! This crate holds the request and response types for every endpoint, the
//! [`UserDevice`] data model, and the error taxonomy ([`ErrorType`]) along
//! with its mapping onto the standardized OAuth2 error vocabulary. Both the
//! server and any native client link against this crate so that the wire
//! contract only exists in one place.

pub mod api;
pub mod utils;

/// Commonly used types, re-exported for convenience
pub mod prelude {
	pub use crate::{utils::Base64String, ErrorType, UserDevice};
}

mod error;
mod user_device;

pub use self::{error::*, user_device::*};
