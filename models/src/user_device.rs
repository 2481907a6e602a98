use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::utils::Base64String;

/// The persistent unit of trust: a client application instance, identified
/// by a stable client-generated identifier, that has been (or is being)
/// bound to a user account.
///
/// A device moves through a small state machine: it is created untrusted and
/// unowned when registration is initiated, claimed and marked trusted when
/// the OTP-verified completion step succeeds, and from then on may
/// authenticate through the device-authentication grant until an admin
/// revokes its trust or blocks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDevice {
	/// Client-generated identifier, globally unique across the store
	pub device_id: String,
	/// The exclusive owning user. Set only once, by the registration
	/// completion step, and immutable thereafter
	pub owner_user_id: Option<Uuid>,
	/// The platform the device runs on (`android`, `ios`, `web`, ...).
	/// Descriptive metadata only
	pub platform: String,
	/// User-visible device name
	pub name: Option<String>,
	/// Hardware model
	pub model: Option<String>,
	/// Operating system version
	pub os_version: Option<String>,
	/// Whether the device completed OTP-verified registration. Only the
	/// completion handler ever sets this, and it is never set back to true
	/// automatically once revoked
	pub is_trusted: bool,
	/// When true, the device-authentication grant may not bypass password
	/// login for this device
	pub requires_password: bool,
	/// When true, the device-authentication grant always fails for this
	/// device regardless of any other state
	pub blocked: bool,
	/// The device's Ed25519 verifying key, stored at registration
	/// completion and used to check the signed assertion presented at the
	/// token endpoint
	pub public_key: Option<Base64String>,
	/// When trust became effective
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trust_activation_date: Option<OffsetDateTime>,
	/// When the remembered multi-factor session for this device lapses
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mfa_session_expiration_date: Option<OffsetDateTime>,
}

impl UserDevice {
	/// A fresh, untrusted, unowned device row carrying only the identifier
	/// and metadata. This is what the initiation step persists
	pub fn pending(device_id: impl Into<String>, platform: impl Into<String>) -> Self {
		Self {
			device_id: device_id.into(),
			owner_user_id: None,
			platform: platform.into(),
			name: None,
			model: None,
			os_version: None,
			is_trusted: false,
			requires_password: false,
			blocked: false,
			public_key: None,
			trust_activation_date: None,
			mfa_session_expiration_date: None,
		}
	}

	/// Whether the given user may (re-)register this device. An unowned
	/// device may be claimed by anyone; an owned one only by its owner
	pub fn registrable_by(&self, user_id: &Uuid) -> bool {
		match &self.owner_user_id {
			Some(owner) => owner == user_id,
			None => true,
		}
	}
}
