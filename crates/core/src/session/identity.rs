//! Shared session identifier.
//!
//! The identifier and the configuration it was issued for are replaced
//! together under one write lock, so a reader never sees an identifier paired
//! with another session's server pin, and never sees a partial value.

use std::sync::Arc;

use parking_lot::RwLock;

use super::config::SessionConfig;

/// Identifier and configuration of the current session.
#[derive(Debug, Clone)]
pub struct ActiveSession {
	pub id: String,
	pub config: Arc<SessionConfig>,
}

#[derive(Debug, Default)]
struct Slot {
	id: String,
	config: Arc<SessionConfig>,
}

/// Synchronized holder of the session identifier.
///
/// An empty identifier means there is no active session.
#[derive(Debug, Default)]
pub struct SessionIdentity {
	slot: RwLock<Slot>,
}

impl SessionIdentity {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current identifier, or `None` when no session is active.
	pub fn id(&self) -> Option<String> {
		let slot = self.slot.read();
		(!slot.id.is_empty()).then(|| slot.id.clone())
	}

	/// Configuration of the most recent establishment.
	pub fn config(&self) -> Arc<SessionConfig> {
		Arc::clone(&self.slot.read().config)
	}

	/// Consistent snapshot of identifier and configuration.
	pub fn active(&self) -> Option<ActiveSession> {
		let slot = self.slot.read();
		(!slot.id.is_empty()).then(|| ActiveSession {
			id: slot.id.clone(),
			config: Arc::clone(&slot.config),
		})
	}

	pub fn is_active(&self) -> bool {
		!self.slot.read().id.is_empty()
	}

	/// Stores a freshly issued identifier, returning the previous one.
	pub fn replace(&self, id: String, config: Arc<SessionConfig>) -> Option<String> {
		let mut slot = self.slot.write();
		let previous = std::mem::replace(&mut slot.id, id);
		slot.config = config;
		(!previous.is_empty()).then_some(previous)
	}
}
