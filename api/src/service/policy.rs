use crate::{models::AccessTokenData, prelude::*, utils::config::DevicePolicyConfig};

/// Validates a registration request's token and parameters against policy:
/// the token must carry the configured registration scope, and any scopes
/// requested for the eventual device grant must be a subset of what the
/// token itself was granted.
///
/// Eligibility is a predicate over the typed claims structure, so a policy
/// change here is a code change the compiler sees, not a claim-type string
/// in configuration.
pub fn validate_registration_request(
	claims: &AccessTokenData,
	config: &DevicePolicyConfig,
	requested_scope: Option<&str>,
) -> Result<(), ErrorType> {
	if !claims.has_scope(&config.registration_scope) {
		info!(
			"Token for user `{}` lacks the `{}` scope",
			claims.sub, config.registration_scope,
		);
		return Err(ErrorType::InsufficientScope);
	}

	if let Some(requested) = requested_scope {
		let overreach = requested
			.split_ascii_whitespace()
			.find(|scope| !claims.has_scope(scope));
		if let Some(scope) = overreach {
			info!("User `{}` requested the ungranted scope `{scope}`", claims.sub);
			return Err(ErrorType::InsufficientScope);
		}
	}

	Ok(())
}

/// Whether the session behind the given claims satisfies the configured
/// skip-OTP condition. The predicate is a property of the session (its
/// authentication-method references), so initiation and completion can both
/// evaluate it statelessly: initiation skips delivery, completion skips
/// verification
pub fn session_skips_otp(claims: &AccessTokenData, config: &DevicePolicyConfig) -> bool {
	claims.amr.iter().any(|method| config.skip_otp_amr.contains(method))
}

#[cfg(test)]
mod tests {
	use std::ops::Add;

	use time::OffsetDateTime;

	use super::*;

	fn claims_with(scope: &str, amr: &[&str]) -> AccessTokenData {
		let now = OffsetDateTime::now_utc();
		AccessTokenData {
			iss: "https://auth.example.com".to_string(),
			sub: Uuid::new_v4(),
			aud: "https://api.example.com".to_string(),
			exp: now.add(constants::ACCESS_TOKEN_VALIDITY),
			nbf: now,
			iat: now,
			jti: Uuid::new_v4(),
			typ: constants::ACCESS_TOKEN_TYP.to_string(),
			scope: scope.to_string(),
			amr: amr.iter().map(ToString::to_string).collect(),
			phone_number: None,
			phone_number_verified: false,
			device_id: None,
		}
	}

	#[test]
	fn registration_scope_is_required() {
		let config = DevicePolicyConfig::default();
		let claims = claims_with("profile", &["pwd"]);
		assert_eq!(
			validate_registration_request(&claims, &config, None).unwrap_err(),
			ErrorType::InsufficientScope,
		);
	}

	#[test]
	fn requested_scopes_must_be_granted() {
		let config = DevicePolicyConfig::default();
		let claims = claims_with("device:register profile", &["pwd"]);
		assert!(validate_registration_request(&claims, &config, Some("profile")).is_ok());
		assert_eq!(
			validate_registration_request(&claims, &config, Some("profile admin")).unwrap_err(),
			ErrorType::InsufficientScope,
		);
	}

	#[test]
	fn mfa_sessions_skip_the_challenge() {
		let config = DevicePolicyConfig::default();
		assert!(session_skips_otp(&claims_with("device:register", &["pwd", "mfa"]), &config));
		assert!(!session_skips_otp(&claims_with("device:register", &["pwd"]), &config));
	}
}
