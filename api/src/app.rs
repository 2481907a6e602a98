use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{
	prelude::*,
	routes,
	service::{OtpChallengeIssuer, TokenIssuer, UserDeviceStore},
};

/// Everything a handler needs, shared across requests. Handlers are
/// stateless per request; the device store is the single shared mutable
/// resource, reached through its trait so the composition (and the test
/// doubles) are decided at startup
#[derive(Clone)]
pub struct App {
	/// The parsed configuration
	pub config: AppConfig,
	/// The device store chain composed in `main`
	pub devices: Arc<dyn UserDeviceStore>,
	/// The OTP delivery and verification collaborator
	pub otp: Arc<dyn OtpChallengeIssuer>,
	/// Mints the tokens handed out by the device grant
	pub tokens: TokenIssuer,
}

/// Builds the full router with request tracing attached
pub fn create_router(app: App) -> Router {
	routes::create_sub_app()
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

/// Serves the application until ctrl-c
pub async fn start_server(app: App) -> anyhow::Result<()> {
	let bind_addr = app.config.bind_addr;
	let environment = app.config.environment.clone();
	let router = create_router(app);

	info!("Listening for connections on {bind_addr} ({environment})");
	axum::Server::bind(&bind_addr)
		.serve(router.into_make_service())
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			info!("Shutting down");
		})
		.await?;

	Ok(())
}
