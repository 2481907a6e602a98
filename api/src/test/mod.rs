//! Test harness for the service: an in-memory device store, a mock OTP
//! issuer, and helpers to drive the real router with protocol-shaped
//! requests


use std::{
	collections::{HashMap, HashSet},
	net::SocketAddr,
	ops::Add,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
		Mutex,
	},
};

use axum::{
	body::Body,
	http::{header, Request, StatusCode},
	Router,
};
use time::OffsetDateTime;
use tower::ServiceExt;

use crate::{
	app,
	models::AccessTokenData,
	prelude::*,
	service::{OtpChallengeIssuer, TokenIssuer, UserDeviceStore},
	utils::config::{
		DatabaseConfig,
		DevicePolicyConfig,
		JwtConfig,
		OtpServiceConfig,
		RunningEnvironment,
	},
};

/// The fixed code every mock challenge expects
pub const TEST_OTP_CODE: &str = "123456";

/// A [`UserDeviceStore`] backed by a mutex-guarded map. The mutex stands in
/// for the uniqueness and guarded-upsert guarantees the production store
/// gets from Postgres
#[derive(Default)]
pub struct InMemoryDeviceStore {
	/// The rows, keyed by device id
	rows: Mutex<HashMap<String, UserDevice>>,
}

impl InMemoryDeviceStore {
	/// Inserts a row directly, bypassing the registration flow
	pub fn seed(&self, device: UserDevice) {
		self.rows.lock().unwrap().insert(device.device_id.clone(), device);
	}

	/// A snapshot of the row for the given device id
	pub fn row(&self, device_id: &str) -> Option<UserDevice> {
		self.rows.lock().unwrap().get(device_id).cloned()
	}
}

#[axum::async_trait]
impl UserDeviceStore for InMemoryDeviceStore {
	async fn get_by_device_id(&self, device_id: &str) -> Result<Option<UserDevice>, ErrorType> {
		Ok(self.row(device_id))
	}

	async fn register_pending(
		&self,
		device: &UserDevice,
		claimant: &Uuid,
	) -> Result<(), ErrorType> {
		let mut rows = self.rows.lock().unwrap();
		match rows.get_mut(&device.device_id) {
			Some(existing) => {
				if existing.registrable_by(claimant) {
					existing.platform = device.platform.clone();
					existing.name = device.name.clone();
					existing.model = device.model.clone();
					existing.os_version = device.os_version.clone();
				}
			}
			None => {
				rows.insert(device.device_id.clone(), device.clone());
			}
		}
		Ok(())
	}

	async fn finalize_trust(
		&self,
		device_id: &str,
		owner: &Uuid,
		public_key: &[u8],
		now: OffsetDateTime,
		mfa_session_expiration: OffsetDateTime,
	) -> Result<UserDevice, ErrorType> {
		let mut rows = self.rows.lock().unwrap();
		let row = rows
			.entry(device_id.to_string())
			.or_insert_with(|| UserDevice::pending(device_id, "unknown"));

		if !row.registrable_by(owner) {
			return Err(ErrorType::DeviceOwnedByAnotherUser);
		}

		row.owner_user_id = Some(*owner);
		row.is_trusted = true;
		row.public_key = Some(public_key.into());
		row.trust_activation_date = Some(now);
		row.mfa_session_expiration_date = Some(mfa_session_expiration);

		Ok(row.clone())
	}
}

/// An [`OtpChallengeIssuer`] that records deliveries and enforces the
/// single-use rule locally, the way the real collaborator does remotely
#[derive(Default)]
pub struct MockOtpIssuer {
	/// Every `(purpose, phone_number)` pair that was delivered
	pub sent: Mutex<Vec<(String, String)>>,
	/// Purposes with a live, unconsumed challenge
	live: Mutex<HashSet<String>>,
	/// When set, deliveries fail the way an unreachable service would
	pub fail_delivery: AtomicBool,
}

#[axum::async_trait]
impl OtpChallengeIssuer for MockOtpIssuer {
	async fn send(&self, purpose: &str, phone_number: &str) -> Result<(), ErrorType> {
		if self.fail_delivery.load(Ordering::SeqCst) {
			return Err(ErrorType::OtpDeliveryFailed);
		}
		self.sent
			.lock()
			.unwrap()
			.push((purpose.to_string(), phone_number.to_string()));
		self.live.lock().unwrap().insert(purpose.to_string());
		Ok(())
	}

	async fn verify(&self, purpose: &str, code: &str) -> Result<bool, ErrorType> {
		if code != TEST_OTP_CODE {
			return Ok(false);
		}
		// Verification consumes the challenge; a second call with the same
		// code must fail
		Ok(self.live.lock().unwrap().remove(purpose))
	}
}

/// The assembled application under test, with handles to its collaborators
pub struct TestHarness {
	/// The real router, serving the real handlers
	pub router: Router,
	/// The in-memory device store behind the handlers
	pub devices: Arc<InMemoryDeviceStore>,
	/// The mock OTP issuer behind the handlers
	pub otp: Arc<MockOtpIssuer>,
	/// The configuration the app was built with
	pub config: AppConfig,
}

/// The configuration the harness runs with
pub fn test_config() -> AppConfig {
	AppConfig {
		bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
		environment: RunningEnvironment::Development,
		database: DatabaseConfig {
			host: "localhost".to_string(),
			port: 5432,
			user: "unused".to_string(),
			password: "unused".to_string(),
			database: "unused".to_string(),
			connection_limit: 1,
		},
		jwt: JwtConfig {
			secret: "test-secret".to_string(),
			issuer: "https://auth.example.com".to_string(),
			audience: "https://api.example.com".to_string(),
		},
		otp: OtpServiceConfig {
			base_url: "http://127.0.0.1:1".to_string(),
			api_key: "unused".to_string(),
		},
		device: DevicePolicyConfig::default(),
	}
}

/// Builds the application with test doubles for both collaborators
pub fn harness() -> TestHarness {
	let config = test_config();
	let devices = Arc::new(InMemoryDeviceStore::default());
	let otp = Arc::new(MockOtpIssuer::default());

	let router = app::create_router(App {
		config: config.clone(),
		devices: devices.clone(),
		otp: otp.clone(),
		tokens: TokenIssuer::new(config.jwt.clone()),
	});

	TestHarness {
		router,
		devices,
		otp,
		config,
	}
}

/// Mints a bearer token for the given user, the way the token-issuance
/// subsystem would for a logged-in session
pub fn user_token(
	config: &AppConfig,
	user_id: &Uuid,
	verified_phone: bool,
	amr: &[&str],
) -> String {
	let now = OffsetDateTime::now_utc();
	AccessTokenData {
		iss: config.jwt.issuer.clone(),
		sub: *user_id,
		aud: config.jwt.audience.clone(),
		exp: now.add(constants::ACCESS_TOKEN_VALIDITY),
		nbf: now,
		iat: now,
		jti: Uuid::new_v4(),
		typ: constants::ACCESS_TOKEN_TYP.to_string(),
		scope: "device:register profile".to_string(),
		amr: amr.iter().map(ToString::to_string).collect(),
		phone_number: Some("+15550100".to_string()),
		phone_number_verified: verified_phone,
		device_id: None,
	}
	.sign(&config.jwt)
	.unwrap()
}

/// Posts a form-encoded body to the given path and returns the status with
/// the parsed JSON response
pub async fn post_form(
	router: &Router,
	path: &str,
	bearer: Option<&str>,
	fields: &[(&str, &str)],
) -> (StatusCode, serde_json::Value) {
	let body = serde_urlencoded::to_string(fields).unwrap();
	let mut request = Request::builder()
		.method("POST")
		.uri(path)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
	if let Some(token) = bearer {
		request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
	}

	let response = router
		.clone()
		.oneshot(request.body(Body::from(body)).unwrap())
		.await
		.unwrap();

	let status = response.status();
	let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
	let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
	(status, value)
}
