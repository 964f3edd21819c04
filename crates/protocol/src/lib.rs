//! Wire types for the anonymous chat HTTP protocol.
//!
//! This crate contains the shapes of data as they appear on the wire and the
//! decoder that turns a raw `/events` body into typed [`Event`]s.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No I/O, no shared state
//! * 1:1 with the wire: one [`EventKind`] per discriminant the service emits
//! * Lenient per tuple, strict per batch (see [`decode_events`])
//!
//! The session client that talks to the service lives in `om-rs`.

pub mod decode;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod log;
pub mod status;

pub use decode::{SkipReason, decode_events, decode_identifier, decode_tuple, unescape_message};
pub use endpoint::*;
pub use error::{DecodeError, Result};
pub use event::{Event, EventKind, SessionPhase};
pub use log::{LogEntry, encode_log};
pub use status::StatusRecord;
