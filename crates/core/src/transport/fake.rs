//! Fake transport for driving the session manager without a network.
//!
//! Replies are scripted per command (the last path segment of the URL).
//! One-shot replies are consumed first, then the standing reply is used.
//! Every request is recorded for inspection.
//!
//! # Example
//!
//! ```ignore
//! let transport = FakeTransport::new();
//! transport.respond("start", "\"shard:abc\"");
//! transport.respond_once("events", r#"[["connected"]]"#);
//!
//! let manager = SessionManager::with_transport(transport.clone());
//! manager.establish(SessionConfig::default()).await?;
//! let events = manager.poll().await?;
//!
//! assert_eq!(transport.requests_to("events")[0].param("id"), Some("shard:abc"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Method, Transport};
use crate::error::{Error, Result};

type Responder = Arc<dyn Fn(&RecordedRequest) -> String + Send + Sync>;

#[derive(Clone)]
enum Reply {
	Body(String),
	Fail(String),
	Dynamic(Responder),
}

#[derive(Default)]
struct Route {
	queued: VecDeque<Reply>,
	standing: Option<Reply>,
}

#[derive(Default)]
struct Inner {
	routes: Mutex<HashMap<String, Route>>,
	sent: Mutex<Vec<RecordedRequest>>,
	latency: Mutex<Option<Duration>>,
}

/// A request captured by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
	pub method: Method,
	pub url: String,
	pub command: String,
	pub params: Vec<(String, String)>,
}

impl RecordedRequest {
	/// Value of the first parameter named `name`.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Parameter names in the order they were sent.
	pub fn param_names(&self) -> Vec<&str> {
		self.params.iter().map(|(key, _)| key.as_str()).collect()
	}
}

/// Scripted in-memory [`Transport`].
///
/// Cloning shares the script and the request log, so a test can keep one
/// handle while the session manager owns another.
#[derive(Clone, Default)]
pub struct FakeTransport {
	inner: Arc<Inner>,
}

impl FakeTransport {
	/// Creates a transport with no scripted replies.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the standing reply body for `command`.
	pub fn respond(&self, command: &str, body: impl Into<String>) -> &Self {
		self.route(command, |route| route.standing = Some(Reply::Body(body.into())));
		self
	}

	/// Queues a reply body used by the next request to `command` only.
	pub fn respond_once(&self, command: &str, body: impl Into<String>) -> &Self {
		self.route(command, |route| route.queued.push_back(Reply::Body(body.into())));
		self
	}

	/// Computes the standing reply for `command` from each request.
	pub fn respond_with<F>(&self, command: &str, responder: F) -> &Self
	where
		F: Fn(&RecordedRequest) -> String + Send + Sync + 'static,
	{
		self.route(command, |route| route.standing = Some(Reply::Dynamic(Arc::new(responder))));
		self
	}

	/// Makes every request to `command` fail with a transport error.
	pub fn fail(&self, command: &str, message: impl Into<String>) -> &Self {
		self.route(command, |route| route.standing = Some(Reply::Fail(message.into())));
		self
	}

	/// Queues a transport error for the next request to `command` only.
	pub fn fail_once(&self, command: &str, message: impl Into<String>) -> &Self {
		self.route(command, |route| route.queued.push_back(Reply::Fail(message.into())));
		self
	}

	/// Delays every reply, to widen interleavings in concurrency tests.
	pub fn set_latency(&self, latency: Duration) -> &Self {
		*self.inner.latency.lock() = Some(latency);
		self
	}

	/// All requests sent so far.
	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.inner.sent.lock().clone()
	}

	/// Requests sent to `command`.
	pub fn requests_to(&self, command: &str) -> Vec<RecordedRequest> {
		self.inner.sent.lock().iter().filter(|request| request.command == command).cloned().collect()
	}

	/// Takes all recorded requests, clearing the log.
	pub fn take_requests(&self) -> Vec<RecordedRequest> {
		std::mem::take(&mut *self.inner.sent.lock())
	}

	fn route(&self, command: &str, update: impl FnOnce(&mut Route)) {
		update(self.inner.routes.lock().entry(command.to_string()).or_default());
	}

	fn next_reply(&self, command: &str) -> Option<Reply> {
		let mut routes = self.inner.routes.lock();
		let route = routes.get_mut(command)?;
		route.queued.pop_front().or_else(|| route.standing.clone())
	}
}

#[async_trait]
impl Transport for FakeTransport {
	async fn request(&self, method: Method, url: &str, params: &[(&str, &str)]) -> Result<String> {
		let command = url.rsplit('/').next().unwrap_or_default().to_string();
		let request = RecordedRequest {
			method,
			url: url.to_string(),
			command: command.clone(),
			params: params.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect(),
		};
		self.inner.sent.lock().push(request.clone());

		let latency = *self.inner.latency.lock();
		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}

		match self.next_reply(&command) {
			Some(Reply::Body(body)) => Ok(body),
			Some(Reply::Dynamic(responder)) => Ok(responder(&request)),
			Some(Reply::Fail(message)) => Err(Error::transport(url, io::Error::new(io::ErrorKind::ConnectionReset, message))),
			None => Err(Error::transport(
				url,
				io::Error::new(io::ErrorKind::NotFound, format!("no scripted reply for /{command}")),
			)),
		}
	}
}
