use std::ops::Add;

use time::OffsetDateTime;

use crate::{models::AccessTokenData, prelude::*, utils::config::JwtConfig};

/// Mints the token pair handed out by the device-authentication grant.
///
/// Tokens are HS256 JWTs signed with the secret shared with the rest of the
/// token-issuance subsystem; claims composition beyond what the grant needs
/// (the owner, the device, and the authentication methods) is that
/// subsystem's concern.
#[derive(Clone)]
pub struct TokenIssuer {
	/// Signing and validation parameters
	jwt: JwtConfig,
}

impl TokenIssuer {
	/// Creates an issuer signing with the given parameters
	pub fn new(jwt: JwtConfig) -> Self {
		Self { jwt }
	}

	/// Issues an access/refresh token pair for the owner of an
	/// authenticated device. `mfa_session_active` decides whether the
	/// session still counts as multi-factor or a step-up factor will be
	/// required downstream
	pub fn issue_device_tokens(
		&self,
		owner: &Uuid,
		device_id: &str,
		mfa_session_active: bool,
		now: OffsetDateTime,
	) -> Result<TokenResponse, ErrorType> {
		let mut amr = vec!["device".to_string()];
		if mfa_session_active {
			amr.push("mfa".to_string());
		}

		let access_token = AccessTokenData {
			iss: self.jwt.issuer.clone(),
			sub: *owner,
			aud: self.jwt.audience.clone(),
			exp: now.add(constants::ACCESS_TOKEN_VALIDITY),
			nbf: now,
			iat: now,
			jti: Uuid::new_v4(),
			typ: constants::ACCESS_TOKEN_TYP.to_string(),
			scope: String::new(),
			amr: amr.clone(),
			phone_number: None,
			phone_number_verified: false,
			device_id: Some(device_id.to_string()),
		}
		.sign(&self.jwt)?;

		let refresh_token = AccessTokenData {
			iss: self.jwt.issuer.clone(),
			sub: *owner,
			aud: self.jwt.audience.clone(),
			exp: now.add(constants::REFRESH_TOKEN_VALIDITY),
			nbf: now,
			iat: now,
			jti: Uuid::new_v4(),
			typ: constants::REFRESH_TOKEN_TYP.to_string(),
			scope: String::new(),
			amr,
			phone_number: None,
			phone_number_verified: false,
			device_id: Some(device_id.to_string()),
		}
		.sign(&self.jwt)?;

		Ok(TokenResponse {
			access_token,
			token_type: constants::BEARER_TOKEN_TYPE.to_string(),
			expires_in: constants::ACCESS_TOKEN_VALIDITY.whole_seconds() as u64,
			refresh_token,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_jwt_config() -> JwtConfig {
		JwtConfig {
			secret: "test-secret".to_string(),
			issuer: "https://auth.example.com".to_string(),
			audience: "https://api.example.com".to_string(),
		}
	}

	#[test]
	fn issued_access_tokens_carry_the_device_and_owner() {
		let config = test_jwt_config();
		let issuer = TokenIssuer::new(config.clone());
		let owner = Uuid::new_v4();
		let response = issuer
			.issue_device_tokens(&owner, "dev-1", false, OffsetDateTime::now_utc())
			.unwrap();

		let claims = AccessTokenData::parse(&response.access_token, &config).unwrap();
		assert_eq!(claims.sub, owner);
		assert_eq!(claims.device_id.as_deref(), Some("dev-1"));
		assert_eq!(claims.amr, vec!["device".to_string()]);
		assert_eq!(response.token_type, "Bearer");
		assert_eq!(response.expires_in, 3600);
	}

	#[test]
	fn live_mfa_sessions_are_reflected_in_amr() {
		let config = test_jwt_config();
		let issuer = TokenIssuer::new(config.clone());
		let response = issuer
			.issue_device_tokens(&Uuid::new_v4(), "dev-1", true, OffsetDateTime::now_utc())
			.unwrap();

		let claims = AccessTokenData::parse(&response.access_token, &config).unwrap();
		assert!(claims.amr.contains(&"mfa".to_string()));
	}

	#[test]
	fn refresh_tokens_cannot_be_used_as_access_tokens() {
		let config = test_jwt_config();
		let issuer = TokenIssuer::new(config.clone());
		let response = issuer
			.issue_device_tokens(&Uuid::new_v4(), "dev-1", false, OffsetDateTime::now_utc())
			.unwrap();

		assert_eq!(
			AccessTokenData::parse(&response.refresh_token, &config).unwrap_err(),
			ErrorType::MalformedAccessToken,
		);
	}
}
