//! [`reqwest`]-backed implementation of [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use super::{Method, Transport};
use crate::error::{Error, Result};

/// HTTP transport backed by a pooled [`reqwest::Client`].
///
/// No request timeout is set by default: `/events` is a long poll and
/// returns only when the service has something to report.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
	inner: reqwest::Client,
}

impl HttpTransport {
	/// Creates a transport with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a transport that gives up on requests after `timeout`.
	pub fn with_timeout(timeout: Duration) -> Result<Self> {
		let inner = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| Error::transport("<client>", e))?;
		Ok(Self { inner })
	}

	/// Wraps an existing client.
	pub fn from_client(inner: reqwest::Client) -> Self {
		Self { inner }
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn request(&self, method: Method, url: &str, params: &[(&str, &str)]) -> Result<String> {
		let builder = match method {
			Method::Get => self.inner.get(url).query(params),
			Method::Post => self.inner.post(url).form(params),
		};

		let response = builder.send().await.map_err(|e| Error::transport(url, e))?;
		let status = response.status();
		let body = response.text().await.map_err(|e| Error::transport(url, e))?;
		trace!(target = "om.transport", ?method, url, %status, bytes = body.len(), "response");

		Ok(body)
	}
}
