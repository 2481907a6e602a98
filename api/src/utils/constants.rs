//! Constants used across the service

use time::Duration;

/// How long an issued access token is valid for
pub const ACCESS_TOKEN_VALIDITY: Duration = Duration::hours(1);

/// How long an issued refresh token is valid for
pub const REFRESH_TOKEN_VALIDITY: Duration = Duration::days(30);

/// How long a remembered multi-factor session established at registration
/// completion lasts before the grant stops reflecting `mfa` in `amr`
pub const MFA_SESSION_VALIDITY: Duration = Duration::days(30);

/// The `typ` claim of access tokens
pub const ACCESS_TOKEN_TYP: &str = "accessToken";

/// The `typ` claim of refresh tokens
pub const REFRESH_TOKEN_TYP: &str = "refreshToken";

/// The grant-context component of OTP purpose strings. A purpose string is
/// `{context}:{user_id}:{device_id}`, binding each challenge to one (user,
/// device) pair so a code issued for one registration cannot be replayed
/// against another
pub const OTP_PURPOSE_CONTEXT: &str = "device_registration";

/// The `token_type` returned by the token endpoint
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// The length of an Ed25519 verifying key uploaded at registration
/// completion
pub const DEVICE_PUBLIC_KEY_LENGTH: usize = 32;
