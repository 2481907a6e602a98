//! All routes exposed by the service

pub mod auth;

use axum::Router;

use crate::prelude::*;

/// Creates the router for every endpoint of the service
pub fn create_sub_app() -> Router<App> {
	Router::new().merge(auth::create_sub_app())
}
