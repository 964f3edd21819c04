//! Error types for the session client.

use om_protocol::DecodeError;
use thiserror::Error;

/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`SessionManager`](crate::SessionManager).
///
/// The client never retries or reconnects on its own; every variant is
/// returned to the caller as-is.
#[derive(Debug, Error)]
pub enum Error {
	/// Network or I/O failure.
	#[error("request to {url} failed: {source}")]
	Transport {
		url: String,
		#[source]
		source: BoxError,
	},

	/// The action needs a session identifier and none is set.
	#[error("no active session")]
	NoSession,

	/// A fire-and-forget action got something other than its acknowledgement.
	#[error("unexpected response from /{command}: {body:?}")]
	UnexpectedBody { command: &'static str, body: String },

	/// A poll, status, or establishment body had the wrong shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The caller passed an unusable argument.
	#[error("invalid argument: {0}")]
	InvalidArgument(&'static str),

	/// A request parameter could not be encoded.
	#[error("failed to encode request parameter: {0}")]
	Encode(#[from] serde_json::Error),
}

impl Error {
	pub(crate) fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
		Self::Transport {
			url: url.into(),
			source: source.into(),
		}
	}

	/// Returns true for network failures.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}

	/// Returns true when the action was attempted without a session.
	pub fn is_no_session(&self) -> bool {
		matches!(self, Self::NoSession)
	}

	/// Returns true when the service answered with an unexpected body.
	pub fn is_unexpected_body(&self) -> bool {
		matches!(self, Self::UnexpectedBody { .. })
	}

	/// Returns true for decode failures of any kind.
	pub fn is_decode(&self) -> bool {
		matches!(self, Self::Decode(_))
	}

	/// Returns true when the caller passed an invalid argument.
	pub fn is_invalid_argument(&self) -> bool {
		matches!(self, Self::InvalidArgument(_))
	}

	/// Raw response body attached to this error, if any.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::UnexpectedBody { body, .. } => Some(body),
			Self::Decode(err) => err.body(),
			_ => None,
		}
	}
}
