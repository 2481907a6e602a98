use std::{
	env,
	fmt::{Display, Formatter},
	net::SocketAddr,
};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Reads the configuration for the current running environment, layering
/// `config/{dev,prod}` files under an `APP_`-prefixed environment source
#[instrument]
pub fn parse_config() -> AppConfig {
	trace!("Reading config data...");

	let env = if cfg!(debug_assertions) {
		"dev".to_string()
	} else {
		env::var("APP_ENV").unwrap_or_else(|_| "prod".into())
	};

	match env.as_ref() {
		"prod" | "production" => Config::builder()
			.add_source(File::with_name("config/prod").required(false))
			.set_default("environment", "production")
			.expect("unable to set environment to production"),
		"dev" | "development" => Config::builder()
			.add_source(File::with_name("config/dev").required(false))
			.set_default("environment", "development")
			.expect("unable to set environment to development"),
		_ => {
			panic!("Unknown running environment found!");
		}
	}
	.add_source(Environment::with_prefix("APP").separator("_"))
	.build()
	.expect("unable to merge with environment variables")
	.try_deserialize()
	.expect("unable to parse settings")
}

/// The full configuration of the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	/// The address the server binds to
	pub bind_addr: SocketAddr,
	/// The environment the service runs in
	pub environment: RunningEnvironment,
	/// The database behind the device store
	pub database: DatabaseConfig,
	/// Token signing and validation
	pub jwt: JwtConfig,
	/// The external OTP delivery and verification service
	pub otp: OtpServiceConfig,
	/// Policy knobs for the device registration flow
	#[serde(default)]
	pub device: DevicePolicyConfig,
}

/// The environment the application is running in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunningEnvironment {
	/// Local development
	Development,
	/// Production
	Production,
}

impl Display for RunningEnvironment {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"{}",
			match self {
				RunningEnvironment::Development => "Development",
				RunningEnvironment::Production => "Production",
			}
		)
	}
}

/// Postgres connection parameters for the device store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
	/// The host the database runs on
	pub host: String,
	/// The port the database listens on
	pub port: u16,
	/// The user to connect as
	pub user: String,
	/// The password to connect with
	pub password: String,
	/// The database to use
	pub database: String,
	/// The maximum number of pooled connections
	pub connection_limit: u32,
}

/// Signing and validation parameters for issued and accepted tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtConfig {
	/// The HS256 secret shared with the token-issuance subsystem
	pub secret: String,
	/// The `iss` claim minted into, and required of, every token
	pub issuer: String,
	/// The `aud` claim minted into, and required of, every token
	pub audience: String,
}

/// Where and how one-time passwords are delivered and verified. The
/// challenge lifecycle (expiry, single-use enforcement) is entirely owned by
/// this external service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpServiceConfig {
	/// Base URL of the verification service
	pub base_url: String,
	/// API key sent as a bearer credential
	pub api_key: String,
}

/// Policy for the device registration flow. These are boundary
/// configuration, not core invariants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePolicyConfig {
	/// The scope an access token must carry to register a device
	#[serde(default = "default_registration_scope")]
	pub registration_scope: String,
	/// Authentication-method references that let a session skip the OTP
	/// challenge (an already-strongly-authenticated session, typically)
	#[serde(default = "default_skip_otp_amr")]
	pub skip_otp_amr: Vec<String>,
	/// How old (or ahead of the clock) a signed assertion may be, in
	/// seconds, before the token endpoint rejects it
	#[serde(default = "default_assertion_max_age_secs")]
	pub assertion_max_age_secs: i64,
}

impl Default for DevicePolicyConfig {
	fn default() -> Self {
		Self {
			registration_scope: default_registration_scope(),
			skip_otp_amr: default_skip_otp_amr(),
			assertion_max_age_secs: default_assertion_max_age_secs(),
		}
	}
}

/// The default scope required to register a device
fn default_registration_scope() -> String {
	"device:register".to_string()
}

/// The default set of `amr` values that skip the OTP challenge
fn default_skip_otp_amr() -> Vec<String> {
	vec!["mfa".to_string()]
}

/// The default assertion freshness window
fn default_assertion_max_age_secs() -> i64 {
	300
}
