use models::utils::Base64String;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::{prelude::*, service::UserDeviceStore};

/// The production device store, backed by Postgres.
///
/// Both mutating operations are single guarded statements, so the claim-if-
/// unowned semantics hold across processes without any locking in this
/// service: the unique key on `device_id` collapses concurrent inserts, and
/// the `WHERE` guard on the upserts makes the first completed registration
/// win.
pub struct PgDeviceStore {
	/// The connection pool
	pool: PgPool,
}

impl PgDeviceStore {
	/// Creates a store on the given pool
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

/// A `user_device` row as it comes back from Postgres
#[derive(sqlx::FromRow)]
struct UserDeviceRow {
	/// Client-generated identifier
	device_id: String,
	/// The owning user, if claimed
	owner_user_id: Option<Uuid>,
	/// Platform metadata
	platform: String,
	/// User-visible name
	name: Option<String>,
	/// Hardware model
	model: Option<String>,
	/// OS version
	os_version: Option<String>,
	/// Whether registration completed
	is_trusted: bool,
	/// Whether the grant may not bypass password login
	requires_password: bool,
	/// Whether the grant is disabled outright
	blocked: bool,
	/// Stored Ed25519 verifying key
	public_key: Option<Vec<u8>>,
	/// When trust became effective
	trust_activation_date: Option<OffsetDateTime>,
	/// When the remembered MFA session lapses
	mfa_session_expiration_date: Option<OffsetDateTime>,
}

impl From<UserDeviceRow> for UserDevice {
	fn from(row: UserDeviceRow) -> Self {
		Self {
			device_id: row.device_id,
			owner_user_id: row.owner_user_id,
			platform: row.platform,
			name: row.name,
			model: row.model,
			os_version: row.os_version,
			is_trusted: row.is_trusted,
			requires_password: row.requires_password,
			blocked: row.blocked,
			public_key: row.public_key.map(Base64String::from),
			trust_activation_date: row.trust_activation_date,
			mfa_session_expiration_date: row.mfa_session_expiration_date,
		}
	}
}

#[axum::async_trait]
impl UserDeviceStore for PgDeviceStore {
	async fn get_by_device_id(&self, device_id: &str) -> Result<Option<UserDevice>, ErrorType> {
		let row = sqlx::query_as::<_, UserDeviceRow>(
			r#"
			SELECT
				device_id,
				owner_user_id,
				platform,
				name,
				model,
				os_version,
				is_trusted,
				requires_password,
				blocked,
				public_key,
				trust_activation_date,
				mfa_session_expiration_date
			FROM
				user_device
			WHERE
				device_id = $1;
			"#,
		)
		.bind(device_id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(UserDevice::from))
	}

	async fn register_pending(
		&self,
		device: &UserDevice,
		claimant: &Uuid,
	) -> Result<(), ErrorType> {
		// The guard keeps a racing registration from rewriting the metadata
		// of a row that another user has meanwhile claimed
		sqlx::query(
			r#"
			INSERT INTO
				user_device(
					device_id,
					platform,
					name,
					model,
					os_version
				)
			VALUES
				($1, $2, $3, $4, $5)
			ON CONFLICT (device_id) DO UPDATE SET
				platform = $2,
				name = $3,
				model = $4,
				os_version = $5
			WHERE
				user_device.owner_user_id IS NULL OR
				user_device.owner_user_id = $6;
			"#,
		)
		.bind(&device.device_id)
		.bind(&device.platform)
		.bind(&device.name)
		.bind(&device.model)
		.bind(&device.os_version)
		.bind(claimant)
		.execute(&self.pool)
		.await?;

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
		let row = sqlx::query_as::<_, UserDeviceRow>(
			r#"
			INSERT INTO
				user_device(
					device_id,
					owner_user_id,
					is_trusted,
					public_key,
					trust_activation_date,
					mfa_session_expiration_date
				)
			VALUES
				($1, $2, TRUE, $3, $4, $5)
			ON CONFLICT (device_id) DO UPDATE SET
				owner_user_id = $2,
				is_trusted = TRUE,
				public_key = $3,
				trust_activation_date = $4,
				mfa_session_expiration_date = $5
			WHERE
				user_device.owner_user_id IS NULL OR
				user_device.owner_user_id = $2
			RETURNING
				device_id,
				owner_user_id,
				platform,
				name,
				model,
				os_version,
				is_trusted,
				requires_password,
				blocked,
				public_key,
				trust_activation_date,
				mfa_session_expiration_date;
			"#,
		)
		.bind(device_id)
		.bind(owner)
		.bind(public_key)
		.bind(now)
		.bind(mfa_session_expiration)
		.fetch_optional(&self.pool)
		.await?
		.ok_or(ErrorType::DeviceOwnedByAnotherUser)?;

		Ok(UserDevice::from(row))
	}
}
