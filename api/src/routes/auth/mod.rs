//! The authentication surface: device registration and the token endpoint

mod device;
mod oauth;

use axum::Router;

use crate::prelude::*;

/// Creates the router for the authentication endpoints
pub fn create_sub_app() -> Router<App> {
	Router::new()
		.merge(device::create_sub_app())
		.merge(oauth::create_sub_app())
}
