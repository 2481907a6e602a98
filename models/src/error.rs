use std::{
	error::Error as StdError,
	fmt::{Display, Formatter},
	mem,
};

use serde::{Deserialize, Serialize};

/// A list of all the possible errors that can be returned by the service.
///
/// The variants are deliberately more fine-grained than the wire vocabulary.
/// Several of them collapse onto the same `error` code in the response (see
/// [`ErrorType::oauth_error_code`]) so that a caller cannot distinguish, for
/// example, a blocked device from one that was never registered, while the
/// server logs still record the exact reason.
#[derive(Debug)]
pub enum ErrorType {
	/// The parameters sent with the request are missing or invalid. This
	/// would ideally not happen unless there is a bug in the client
	WrongParameters,
	/// The request body is not `application/x-www-form-urlencoded`. The
	/// protocol endpoints reject anything else before any business logic
	/// runs
	UnsupportedContentType,
	/// No bearer token was presented at all. This is reported separately
	/// from a malformed token because the protocol responses distinguish
	/// the two conditions
	MissingAuthenticationToken,
	/// The access token (JWT) provided is malformed
	MalformedAccessToken,
	/// The access token provided is expired, not yet valid, or issued for a
	/// different audience
	AuthorizationTokenInvalid,
	/// The device being registered already belongs to another user
	DeviceOwnedByAnotherUser,
	/// The caller has no verified phone number, which is a prerequisite for
	/// binding a device
	PhoneNumberNotVerified,
	/// The access token does not carry the scope required for device
	/// registration
	InsufficientScope,
	/// The one-time password could not be delivered to the user's verified
	/// channel
	OtpDeliveryFailed,
	/// The one-time password provided did not verify. Also returned when a
	/// code was already consumed, since challenges are single-use
	OtpVerificationFailed,
	/// The device credential presented at the token endpoint did not
	/// authenticate. Deliberately uninformative: it covers unknown, blocked,
	/// untrusted and password-required devices as well as bad signatures
	InvalidDeviceCredentials,
	/// The grant type requested at the token endpoint is not supported
	UnsupportedGrantType,
	/// An internal server error occurred. This should not happen unless
	/// there is a bug in the server
	InternalServerError(anyhow::Error),
}

impl ErrorType {
	/// Returns the standardized OAuth2 error code that this error is
	/// reported as on the wire
	pub fn oauth_error_code(&self) -> &'static str {
		match self {
			Self::WrongParameters => "invalid_request",
			Self::UnsupportedContentType => "invalid_request",
			Self::MissingAuthenticationToken => "invalid_token",
			Self::MalformedAccessToken => "invalid_token",
			Self::AuthorizationTokenInvalid => "invalid_token",
			Self::DeviceOwnedByAnotherUser => "invalid_token",
			Self::PhoneNumberNotVerified => "invalid_token",
			Self::InsufficientScope => "insufficient_scope",
			Self::OtpDeliveryFailed => "server_error",
			Self::OtpVerificationFailed => "invalid_grant",
			Self::InvalidDeviceCredentials => "invalid_grant",
			Self::UnsupportedGrantType => "unsupported_grant_type",
			Self::InternalServerError(_) => "server_error",
		}
	}

	/// Returns the status code that should be used for this error. Note that
	/// this is only the default status code and specific endpoints can
	/// override this if needed
	pub fn default_status_code(&self) -> u16 {
		match self {
			Self::WrongParameters => 400,
			Self::UnsupportedContentType => 400,
			Self::MissingAuthenticationToken => 401,
			Self::MalformedAccessToken => 401,
			Self::AuthorizationTokenInvalid => 401,
			Self::DeviceOwnedByAnotherUser => 401,
			Self::PhoneNumberNotVerified => 401,
			Self::InsufficientScope => 403,
			Self::OtpDeliveryFailed => 500,
			Self::OtpVerificationFailed => 400,
			Self::InvalidDeviceCredentials => 400,
			Self::UnsupportedGrantType => 400,
			Self::InternalServerError(_) => 500,
		}
	}

	/// Returns the `error_description` that should be used for this error.
	/// This is the message that is sent to the caller, so it must not leak
	/// anything the error code itself does not already reveal
	pub fn message(&self) -> impl Into<String> {
		match self {
			Self::WrongParameters => "The parameters sent with that request are invalid",
			Self::UnsupportedContentType => {
				"The request body must be application/x-www-form-urlencoded"
			}
			Self::MissingAuthenticationToken => "No access token was provided with that request",
			Self::MalformedAccessToken => "The access token provided is not a valid token",
			Self::AuthorizationTokenInvalid => "The access token provided is no longer valid",
			Self::DeviceOwnedByAnotherUser => "That device does not belong to this user",
			Self::PhoneNumberNotVerified => {
				"A verified phone number is required to register a device"
			}
			Self::InsufficientScope => {
				"The access token is not allowed to perform device registration"
			}
			Self::OtpDeliveryFailed => "The verification code could not be delivered",
			Self::OtpVerificationFailed => "The verification code provided is invalid",
			Self::InvalidDeviceCredentials => "The device credentials provided are invalid",
			Self::UnsupportedGrantType => "That grant type is not supported",
			Self::InternalServerError(_) => "An internal server error has occured",
		}
	}

	/// Creates an [`ErrorType::InternalServerError`] with the given message
	pub fn server_error(message: impl Display) -> Self {
		Self::InternalServerError(anyhow::anyhow!(message.to_string()))
	}
}

impl PartialEq for ErrorType {
	fn eq(&self, other: &Self) -> bool {
		mem::discriminant(self) == mem::discriminant(other)
	}
}

impl Eq for ErrorType {}

impl<Error> From<Error> for ErrorType
where
	Error: StdError + Send + Sync + 'static,
{
	fn from(error: Error) -> Self {
		Self::InternalServerError(error.into())
	}
}

impl Display for ErrorType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message().into())
	}
}

/// The body of every error response: the standardized `error` code along
/// with a human-readable `error_description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// The standardized protocol error code
	pub error: String,
	/// A human-readable description of what went wrong
	pub error_description: String,
}

impl From<&ErrorType> for ErrorResponse {
	fn from(error: &ErrorType) -> Self {
		Self {
			error: error.oauth_error_code().to_string(),
			error_description: error.message().into(),
		}
	}
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ErrorType {
	fn into_response(self) -> axum::response::Response {
		let status = axum::http::StatusCode::from_u16(self.default_status_code())
			.unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
		(status, axum::Json(ErrorResponse::from(&self))).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn grant_failures_share_a_wire_code() {
		// A caller must not be able to tell a blocked or unknown device
		// apart from a bad signature
		assert_eq!(
			ErrorType::InvalidDeviceCredentials.oauth_error_code(),
			ErrorType::OtpVerificationFailed.oauth_error_code(),
		);
		assert_eq!(ErrorType::InvalidDeviceCredentials.oauth_error_code(), "invalid_grant");
	}

	#[test]
	fn missing_token_is_distinct_from_malformed() {
		let missing = ErrorResponse::from(&ErrorType::MissingAuthenticationToken);
		let malformed = ErrorResponse::from(&ErrorType::MalformedAccessToken);
		assert_eq!(missing.error, "invalid_token");
		assert_eq!(malformed.error, "invalid_token");
		assert_ne!(missing.error_description, malformed.error_description);
	}

	#[test]
	fn error_response_round_trips_as_json() {
		let response = ErrorResponse::from(&ErrorType::UnsupportedGrantType);
		let json = serde_json::to_string(&response).unwrap();
		assert!(json.contains("unsupported_grant_type"));
		let parsed = serde_json::from_str::<ErrorResponse>(&json).unwrap();
		assert_eq!(parsed, response);
	}

	#[test]
	fn internal_errors_compare_by_discriminant() {
		assert_eq!(
			ErrorType::server_error("one"),
			ErrorType::InternalServerError(anyhow::anyhow!("two")),
		);
	}
}
