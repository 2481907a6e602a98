use serde::Deserialize;
use serde_json::json;

use crate::{prelude::*, utils::config::OtpServiceConfig};

/// Derives the purpose string binding an OTP challenge to one (user,
/// device) pair. At most one live challenge per purpose is meaningful at a
/// time, and a code issued for one purpose cannot be replayed against
/// another
pub fn challenge_purpose(user_id: &Uuid, device_id: &str) -> String {
	format!("{}:{}:{}", constants::OTP_PURPOSE_CONTEXT, user_id, device_id)
}

/// Wraps the external one-time-password delivery and verification service.
///
/// The challenge lifecycle is entirely owned by that collaborator: expiry,
/// retry budgets and single-use enforcement all happen there. This core
/// only sends challenges and asks for verdicts, and never retries either
/// operation.
#[axum::async_trait]
pub trait OtpChallengeIssuer: Send + Sync {
	/// Issues a challenge for the given purpose, delivered to the given
	/// phone number
	async fn send(&self, purpose: &str, phone_number: &str) -> Result<(), ErrorType>;

	/// Verifies a submitted code against the challenge for the given
	/// purpose. A successful verification consumes the challenge; a second
	/// call with the same code returns `false`
	async fn verify(&self, purpose: &str, code: &str) -> Result<bool, ErrorType>;
}

/// The production issuer, speaking JSON to the verification service over
/// HTTP
pub struct HttpOtpIssuer {
	/// Reused connection pool
	client: reqwest::Client,
	/// Where and how to reach the verification service
	config: OtpServiceConfig,
}

impl HttpOtpIssuer {
	/// Creates an issuer for the configured verification service
	pub fn new(config: OtpServiceConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			config,
		}
	}
}

/// The verification service's verdict on a submitted code
#[derive(Debug, Deserialize)]
struct VerifyResponse {
	/// Whether the code matched a live challenge
	valid: bool,
}

#[axum::async_trait]
impl OtpChallengeIssuer for HttpOtpIssuer {
	async fn send(&self, purpose: &str, phone_number: &str) -> Result<(), ErrorType> {
		let response = self
			.client
			.post(format!("{}/v1/challenges", self.config.base_url))
			.bearer_auth(&self.config.api_key)
			.json(&json!({
				"purpose": purpose,
				"to": phone_number,
				"channel": "sms",
			}))
			.send()
			.await
			.map_err(|err| {
				error!("Could not reach the OTP service: {err}");
				ErrorType::OtpDeliveryFailed
			})?;

		if !response.status().is_success() {
			error!(
				"OTP service refused to deliver a challenge for `{purpose}`: {}",
				response.status(),
			);
			return Err(ErrorType::OtpDeliveryFailed);
		}

		info!("OTP challenge for `{purpose}` queued for delivery");
		Ok(())
	}

	async fn verify(&self, purpose: &str, code: &str) -> Result<bool, ErrorType> {
		let response = self
			.client
			.post(format!("{}/v1/challenges/verify", self.config.base_url))
			.bearer_auth(&self.config.api_key)
			.json(&json!({
				"purpose": purpose,
				"code": code,
			}))
			.send()
			.await
			.map_err(|err| {
				error!("Could not reach the OTP service: {err}");
				ErrorType::server_error(err)
			})?;

		if !response.status().is_success() {
			error!("OTP service failed to verify `{purpose}`: {}", response.status());
			return Err(ErrorType::server_error("OTP verification unavailable"));
		}

		let verdict = response.json::<VerifyResponse>().await.map_err(|err| {
			error!("OTP service returned an unreadable verdict: {err}");
			ErrorType::server_error(err)
		})?;

		Ok(verdict.valid)
	}
}
