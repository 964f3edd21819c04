//! Session client for the anonymous chat HTTP protocol.
//!
//! The service exposes a session over plain HTTP: obtain an identifier from
//! `/start`, long-poll `/events` for connection changes, messages, and typing
//! indicators, and post outgoing actions (`/typing`, `/send`, `/disconnect`)
//! independently.
//!
//! [`SessionManager`] owns the identifier and drives every endpoint. It is
//! meant to be shared (`Arc<SessionManager>`) between a poller task and a
//! sender task. Event decoding lives in [`om_protocol`] and is re-exported
//! here.

pub mod error;
pub mod options;
pub mod session;
pub mod transport;

pub use error::{Error, Result};
pub use om_protocol::{DecodeError, Event, EventKind, LogEntry, SessionPhase, StatusRecord};
pub use options::ClientOptions;
pub use session::{ActiveSession, Mode, SessionConfig, SessionIdentity, SessionManager, SessionManagerBuilder};
pub use transport::{FakeTransport, HttpTransport, Method, RecordedRequest, Transport};

/// Wire types and the event decoder.
pub use om_protocol as protocol;
