use time::OffsetDateTime;
use tokio::sync::mpsc;

use crate::prelude::*;

/// Lookup and persistence abstraction for device records, keyed by the
/// client-supplied device identifier.
///
/// The store is the single shared resource of the service; requests may
/// originate from different processes, so the two mutating operations carry
/// the atomicity the flow needs instead of relying on application-level
/// locking. The persistence engine behind the trait is a collaborator
/// concern.
#[axum::async_trait]
pub trait UserDeviceStore: Send + Sync {
	/// Looks up a device by its identifier
	async fn get_by_device_id(&self, device_id: &str) -> Result<Option<UserDevice>, ErrorType>;

	/// Creates the device row in its pending (untrusted, unowned) state, or
	/// refreshes the metadata of an existing row. Must never mutate a row
	/// owned by a user other than `claimant`; the implementation enforces
	/// this with a guard, not a read-then-write, since a competing
	/// registration may race this call
	async fn register_pending(
		&self,
		device: &UserDevice,
		claimant: &Uuid,
	) -> Result<(), ErrorType>;

	/// Atomically claims the device for `owner` (if unowned) and marks it
	/// trusted, storing the public key and the trust timestamps. Fails with
	/// [`ErrorType::DeviceOwnedByAnotherUser`] when the row is owned by
	/// someone else, which is how a lost registration race surfaces
	async fn finalize_trust(
		&self,
		device_id: &str,
		owner: &Uuid,
		public_key: &[u8],
		now: OffsetDateTime,
		mfa_session_expiration: OffsetDateTime,
	) -> Result<UserDevice, ErrorType>;
}

/// Emitted whenever a device becomes trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTrustEvent {
	/// The device that became trusted
	pub device_id: String,
	/// The user the device was bound to
	pub owner_user_id: Uuid,
	/// When trust became effective
	pub activated_at: OffsetDateTime,
}

/// A [`UserDeviceStore`] that forwards to an inner store and emits a
/// [`DeviceTrustEvent`] whenever a device becomes trusted. Composed around
/// the concrete store at startup; downstream consumers (consent surfaces,
/// push registration) subscribe through the receiver rather than wrapping
/// the store themselves.
pub struct NotifyingDeviceStore<S> {
	/// The store being wrapped
	inner: S,
	/// Where trust activations are published
	events: mpsc::UnboundedSender<DeviceTrustEvent>,
}

impl<S> NotifyingDeviceStore<S>
where
	S: UserDeviceStore,
{
	/// Wraps the given store, returning the receiving end of its event
	/// stream
	pub fn new(inner: S) -> (Self, mpsc::UnboundedReceiver<DeviceTrustEvent>) {
		let (events, receiver) = mpsc::unbounded_channel();
		(Self { inner, events }, receiver)
	}
}

#[axum::async_trait]
impl<S> UserDeviceStore for NotifyingDeviceStore<S>
where
	S: UserDeviceStore,
{
	async fn get_by_device_id(&self, device_id: &str) -> Result<Option<UserDevice>, ErrorType> {
		self.inner.get_by_device_id(device_id).await
	}

	async fn register_pending(
		&self,
		device: &UserDevice,
		claimant: &Uuid,
	) -> Result<(), ErrorType> {
		self.inner.register_pending(device, claimant).await
	}

	async fn finalize_trust(
		&self,
		device_id: &str,
		owner: &Uuid,
		public_key: &[u8],
		now: OffsetDateTime,
		mfa_session_expiration: OffsetDateTime,
	) -> Result<UserDevice, ErrorType> {
		let device = self
			.inner
			.finalize_trust(device_id, owner, public_key, now, mfa_session_expiration)
			.await?;

		info!(
			device_id = %device.device_id,
			owner_user_id = %owner,
			"Device trust activated",
		);
		let _ = self.events.send(DeviceTrustEvent {
			device_id: device.device_id.clone(),
			owner_user_id: *owner,
			activated_at: device.trust_activation_date.unwrap_or(now),
		});

		Ok(device)
	}
}
