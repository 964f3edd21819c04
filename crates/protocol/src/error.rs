//! Decode failures for poll, status, and establishment bodies.

use thiserror::Error;

/// Result alias for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// A response body did not have the shape the protocol expects.
///
/// Every variant keeps the offending body so callers can surface it for
/// diagnostics. For a status record embedded in a poll body that is the
/// re-serialized record object.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// The body is not valid JSON.
	#[error("invalid JSON ({source}): {body:?}")]
	Json {
		body: String,
		#[source]
		source: serde_json::Error,
	},

	/// The body is JSON but the root has the wrong type.
	#[error("malformed root element: {body:?}")]
	MalformedRoot { body: String },

	/// A non-trivial poll body produced no recognizable events.
	#[error("unknown response shape: {body:?}")]
	UnknownShape { body: String },

	/// A status record field is missing or has the wrong type.
	#[error("status record: missing or invalid field `{field}`: {body:?}")]
	Status { field: &'static str, body: String },

	/// The establishment response is not a bare identifier.
	#[error("not a session identifier: {body:?}")]
	BadIdentifier { body: String },
}

impl DecodeError {
	/// Raw response body attached to this error, if any.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::Json { body, .. } | Self::MalformedRoot { body } | Self::UnknownShape { body } | Self::Status { body, .. } | Self::BadIdentifier { body } => Some(body),
		}
	}
}
