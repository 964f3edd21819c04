//! Session lifecycle: configuration, identity, and the manager that drives
//! the service's endpoints.

/// Establishment parameters and matchmaking modes.
pub mod config;
/// Synchronized session identifier.
pub mod identity;
/// Session manager and its builder.
pub mod manager;
/// Per-process random identifier.
pub mod random_id;

pub use config::{Mode, SessionConfig};
pub use identity::{ActiveSession, SessionIdentity};
pub use manager::{SessionManager, SessionManagerBuilder};
