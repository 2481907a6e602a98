use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{prelude::*, utils::config::JwtConfig};

/// The decoded claims of a bearer token.
///
/// The claims a handler cares about are typed fields here rather than
/// late-bound claim-type lookups, so a missing or misspelled claim is a
/// compile error instead of a runtime surprise. Signature and expiry are
/// checked on decode; anything beyond that is the token-issuance
/// subsystem's guarantee and is treated as a pass-through.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
	/// The issuer of the token
	pub iss: String,
	/// The user this token authenticates
	pub sub: Uuid,
	/// The audience the token was minted for
	pub aud: String,
	/// When the token expires
	#[serde(with = "timestamp_as_seconds")]
	pub exp: OffsetDateTime,
	/// When the token becomes valid
	#[serde(with = "timestamp_as_seconds")]
	pub nbf: OffsetDateTime,
	/// When the token was issued
	#[serde(with = "timestamp_as_seconds")]
	pub iat: OffsetDateTime,
	/// Unique token identifier
	pub jti: Uuid,
	/// Whether this is an access or a refresh token
	pub typ: String,
	/// Space-delimited granted scopes
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub scope: String,
	/// Authentication-method references of the session behind this token
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub amr: Vec<String>,
	/// The phone number on record for the user, exposed only when the
	/// token's scopes permit reading it
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	/// Whether that phone number has been verified
	#[serde(default)]
	pub phone_number_verified: bool,
	/// The device this token was minted through, for tokens issued by the
	/// device-authentication grant
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub device_id: Option<String>,
}

impl AccessTokenData {
	/// Decodes and validates a bearer token. Expired, immature or
	/// wrong-audience tokens map to [`ErrorType::AuthorizationTokenInvalid`];
	/// everything else that fails to decode is a malformed token
	pub fn parse(token: &str, config: &JwtConfig) -> Result<Self, ErrorType> {
		let decode_key = DecodingKey::from_secret(config.secret.as_ref());
		let TokenData { header: _, claims } = jsonwebtoken::decode::<Self>(token, &decode_key, &{
			let mut validation = Validation::new(Algorithm::HS256);
			validation.set_issuer(&[&config.issuer]);
			validation.set_audience(&[&config.audience]);
			validation.leeway = 30;
			validation
		})
		.map_err(|err| {
			use jsonwebtoken::errors::ErrorKind;
			match err.kind() {
				ErrorKind::ExpiredSignature |
				ErrorKind::ImmatureSignature |
				ErrorKind::InvalidIssuer |
				ErrorKind::InvalidAudience => {
					info!("Access token failed validation: {err}");
					ErrorType::AuthorizationTokenInvalid
				}
				_ => {
					info!("Access token failed to decode: {err}");
					ErrorType::MalformedAccessToken
				}
			}
		})?;

		if claims.typ != constants::ACCESS_TOKEN_TYP {
			info!("Token presented as a bearer credential has typ `{}`", claims.typ);
			return Err(ErrorType::MalformedAccessToken);
		}

		Ok(claims)
	}

	/// Signs these claims into a compact JWT
	pub fn sign(&self, config: &JwtConfig) -> Result<String, ErrorType> {
		let token = jsonwebtoken::encode(
			&Default::default(),
			&self,
			&EncodingKey::from_secret(config.secret.as_ref()),
		)?;

		Ok(token)
	}

	/// Whether the token carries the given scope
	pub fn has_scope(&self, scope: &str) -> bool {
		self.scope.split_ascii_whitespace().any(|granted| granted == scope)
	}

	/// The user's phone number, but only if it is present and verified
	pub fn verified_phone_number(&self) -> Option<&str> {
		if self.phone_number_verified {
			self.phone_number.as_deref()
		} else {
			None
		}
	}
}

/// Serde adapter storing timestamps as unix seconds, the way JWT registered
/// claims are defined
mod timestamp_as_seconds {
	use serde::{de::Error, Deserialize, Deserializer, Serializer};
	use time::OffsetDateTime;

	/// Serializes the timestamp as unix seconds
	pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(value.unix_timestamp())
	}

	/// Deserializes unix seconds into a timestamp
	pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).and_then(|timestamp| {
			OffsetDateTime::from_unix_timestamp(timestamp)
				.map_err(|_| Error::custom(format!("invalid unix timestamp: {timestamp}")))
		})
	}
}
