//! The device-bound authentication service: a passwordless extension on top
//! of a standard OAuth2/OIDC token service. A mobile or browser device is
//! bound to a user account through an OTP-verified challenge and can then
//! exchange its bound credential for tokens without a password.

mod app;
mod db;
mod models;
mod prelude;
mod routes;
mod service;
mod utils;

#[cfg(test)]
mod test;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
	db::PgDeviceStore,
	prelude::*,
	service::{HttpOtpIssuer, NotifyingDeviceStore, TokenIssuer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = utils::config::parse_config();

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.init();
	debug!("Logger initialized");

	let database = db::connect(&config.database).await;
	db::initialize(&database).await?;
	debug!("Database initialized");

	let (devices, mut trust_events) = NotifyingDeviceStore::new(PgDeviceStore::new(database));
	let devices = Arc::new(devices);
	// Downstream consumers (consent surfaces, push registration) attach
	// here; until they exist the stream is drained so it never backs up
	tokio::spawn(async move {
		while let Some(event) = trust_events.recv().await {
			trace!(
				device_id = %event.device_id,
				owner_user_id = %event.owner_user_id,
				"Device trust event published",
			);
		}
	});
	let otp = Arc::new(HttpOtpIssuer::new(config.otp.clone()));
	let tokens = TokenIssuer::new(config.jwt.clone());

	let app = App {
		config,
		devices,
		otp,
		tokens,
	};

	app::start_server(app).await
}
