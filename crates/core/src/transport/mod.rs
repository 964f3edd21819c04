//! Transport abstraction for the service's HTTP endpoints.
//!
//! A [`Transport`] sends one request with form or query parameters and
//! returns the raw response body. It does no decoding; interpreting the body
//! is up to the session manager.
//!
//! Two implementations ship with the crate:
//! * [`HttpTransport`]: `reqwest`-backed, used against the real service
//! * [`FakeTransport`]: scripted and in-memory, used by tests

mod fake;
mod http;

pub use fake::{FakeTransport, RecordedRequest};
pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::Result;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	/// Parameters are sent in the query string.
	Get,
	/// Parameters are sent as an urlencoded form body.
	Post,
}

/// Sends requests and returns raw response bodies.
///
/// Implementations must be shareable between the poller and sender tasks.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends a request to `url` and returns the response body as text.
	async fn request(&self, method: Method, url: &str, params: &[(&str, &str)]) -> Result<String>;
}
