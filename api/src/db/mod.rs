//! The persistence layer behind the device store

mod user_device;

pub use self::user_device::PgDeviceStore;

use sqlx::{
	postgres::{PgConnectOptions, PgPoolOptions},
	PgPool,
};

use crate::{prelude::*, utils::config::DatabaseConfig};

/// Connects to the database based on a config. Not much to say here
#[instrument(skip(config))]
pub async fn connect(config: &DatabaseConfig) -> PgPool {
	trace!("Connecting to the database");
	PgPoolOptions::new()
		.max_connections(config.connection_limit)
		.connect_with(
			PgConnectOptions::new()
				.username(config.user.as_str())
				.password(config.password.as_str())
				.host(config.host.as_str())
				.port(config.port)
				.database(config.database.as_str()),
		)
		.await
		.expect("Failed to connect to database")
}

/// Creates the schema the device store needs. The unique key on
/// `device_id` is what makes concurrent registrations of the same device
/// resolve to a single row
pub async fn initialize(pool: &PgPool) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS user_device(
			device_id TEXT PRIMARY KEY,
			owner_user_id UUID,
			platform TEXT NOT NULL DEFAULT 'unknown',
			name TEXT,
			model TEXT,
			os_version TEXT,
			is_trusted BOOLEAN NOT NULL DEFAULT FALSE,
			requires_password BOOLEAN NOT NULL DEFAULT FALSE,
			blocked BOOLEAN NOT NULL DEFAULT FALSE,
			public_key BYTEA,
			trust_activation_date TIMESTAMPTZ,
			mfa_session_expiration_date TIMESTAMPTZ
		);
		"#,
	)
	.execute(pool)
	.await?;

	Ok(())
}
