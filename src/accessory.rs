//! Host-facing switch surface.
//!
//! The smart-home host sees the door release as a readable/writable boolean
//! "On" characteristic plus static identification strings. Collaborators are
//! injected through constructors; the crate holds no process-global service
//! or characteristic state, so hosts control initialization order themselves.

// self
use crate::{
	_prelude::*,
	http::HttpClient,
	lock::{DoorLock, ReleaseReceipt},
};

/// Static identification strings surfaced to the smart-home host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessoryInformation {
	/// Manufacturer string reported to the host.
	pub manufacturer: String,
	/// Model string reported to the host.
	pub model: String,
	/// Display name of the switch service.
	pub name: String,
}
impl Default for AccessoryInformation {
	fn default() -> Self {
		Self {
			manufacturer: "ButterflyMX".into(),
			model: "ButterflyMX".into(),
			name: "ButterflyMX Unlock".into(),
		}
	}
}

/// Boolean "On" characteristic bound to a [`DoorLock`].
pub struct DoorSwitch<C>
where
	C: ?Sized + HttpClient,
{
	lock: Arc<DoorLock<C>>,
	information: AccessoryInformation,
}
impl<C> DoorSwitch<C>
where
	C: ?Sized + HttpClient,
{
	/// Binds a switch to the given facade with default identification strings.
	pub fn new(lock: impl Into<Arc<DoorLock<C>>>) -> Self {
		Self { lock: lock.into(), information: AccessoryInformation::default() }
	}

	/// Overrides the identification strings.
	pub fn with_information(mut self, information: AccessoryInformation) -> Self {
		self.information = information;

		self
	}

	/// Identification strings for the host's accessory registry.
	pub fn information(&self) -> &AccessoryInformation {
		&self.information
	}

	/// Facade this switch actuates.
	pub fn lock(&self) -> &Arc<DoorLock<C>> {
		&self.lock
	}

	/// Read handler for the "On" characteristic.
	///
	/// The door state is not introspectable, so this always reports off.
	pub async fn read_on(&self) -> bool {
		self.lock.query_state().await
	}

	/// Write handler for the "On" characteristic.
	///
	/// The release fires for any written value; the physical actuator is
	/// momentary, so "switching off" has nothing to undo.
	pub async fn write_on(&self, _on: bool) -> Result<ReleaseReceipt> {
		self.lock.actuate().await
	}
}
impl<C> Debug for DoorSwitch<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DoorSwitch").field("information", &self.information).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_information_matches_vendor_branding() {
		let information = AccessoryInformation::default();

		assert_eq!(information.manufacturer, "ButterflyMX");
		assert_eq!(information.model, "ButterflyMX");
		assert_eq!(information.name, "ButterflyMX Unlock");
	}
}
