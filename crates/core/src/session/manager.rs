//! Session manager: establishment, outgoing actions, and polling.
//!
//! [`SessionManager`] is shared between a poller and a sender, typically as
//! `Arc<SessionManager>`. Every method takes `&self`; the identifier lives in
//! a [`SessionIdentity`] and is copied out before any request is sent, so no
//! lock is held across network I/O.
//!
//! The manager never retries and never reconnects on its own. Reacting to
//! terminal events (see [`Event::is_terminal`]) is the caller's decision.
//!
//! # Example
//!
//! ```ignore
//! let manager = Arc::new(SessionManager::new());
//! manager.establish(SessionConfig::new().with_topics(["rust"])).await?;
//!
//! loop {
//!     for event in manager.poll().await? {
//!         if let Event::MessageReceived { text } = &event {
//!             manager.send_message(&format!("you said: {text}")).await?;
//!         }
//!     }
//! }
//! ```

use std::sync::{Arc, LazyLock};

use om_protocol::{self as protocol, Event, LogEntry, StatusRecord};
use regex::Regex;
use tracing::{debug, info, trace};

use super::config::SessionConfig;
use super::identity::{ActiveSession, SessionIdentity};
use super::random_id;
use crate::error::{Error, Result};
use crate::options::ClientOptions;
use crate::transport::{HttpTransport, Method, Transport};

static LOG_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+\.png"#).expect("LOG_LINK_RE should compile"));

/// Builder for [`SessionManager`].
#[derive(Default)]
pub struct SessionManagerBuilder {
	transport: Option<Arc<dyn Transport>>,
	options: ClientOptions,
	random_id: Option<String>,
}

impl SessionManagerBuilder {
	/// Uses `transport` instead of the default [`HttpTransport`].
	pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
		self.transport = Some(Arc::new(transport));
		self
	}

	pub fn options(mut self, options: ClientOptions) -> Self {
		self.options = options;
		self
	}

	/// Overrides the per-process random identifier.
	pub fn random_id(mut self, random_id: impl Into<String>) -> Self {
		self.random_id = Some(random_id.into());
		self
	}

	pub fn build(self) -> SessionManager {
		SessionManager {
			transport: self.transport.unwrap_or_else(|| Arc::new(HttpTransport::new())),
			options: self.options,
			random_id: self.random_id.unwrap_or_else(|| random_id::process_random_id().to_string()),
			identity: SessionIdentity::new(),
		}
	}
}

/// Owner of the session identifier and entry point for every endpoint.
pub struct SessionManager {
	transport: Arc<dyn Transport>,
	options: ClientOptions,
	random_id: String,
	identity: SessionIdentity,
}

impl Default for SessionManager {
	fn default() -> Self {
		Self::new()
	}
}

impl SessionManager {
	/// Creates a manager that talks to the default host over HTTP.
	pub fn new() -> Self {
		Self::builder().build()
	}

	/// Creates a manager over a custom transport with default options.
	pub fn with_transport(transport: impl Transport + 'static) -> Self {
		Self::builder().transport(transport).build()
	}

	pub fn builder() -> SessionManagerBuilder {
		SessionManagerBuilder::default()
	}

	pub fn options(&self) -> &ClientOptions {
		&self.options
	}

	/// Per-process random identifier sent with status and log requests.
	pub fn random_id(&self) -> &str {
		&self.random_id
	}

	/// Current session identifier, if any.
	pub fn session_id(&self) -> Option<String> {
		self.identity.id()
	}

	pub fn has_session(&self) -> bool {
		self.identity.is_active()
	}

	/// Configuration of the most recent establishment.
	pub fn config(&self) -> Arc<SessionConfig> {
		self.identity.config()
	}

	/// Requests a new session identifier and makes it current.
	///
	/// The previous identifier, if any, is replaced without being
	/// disconnected first.
	pub async fn establish(&self, config: SessionConfig) -> Result<()> {
		let params = config.establishment_params(&self.random_id)?;
		let params: Vec<(&str, &str)> = params.iter().map(|(name, value)| (*name, value.as_str())).collect();
		let url = self.options.url(config.server.as_deref(), protocol::START);

		let body = self.transport.request(Method::Get, &url, &params).await?;
		let id = protocol::decode_identifier(&body)?;

		info!(
			target = "om.session",
			mode = config.mode.name(),
			server = config.server.as_deref().unwrap_or("-"),
			topics = config.topics.len(),
			"session established"
		);
		self.identity.replace(id, Arc::new(config));
		Ok(())
	}

	/// Tells the peer we are typing.
	pub async fn show_typing(&self) -> Result<()> {
		self.acknowledged(protocol::TYPING, &[]).await
	}

	/// Tells the peer we stopped typing.
	pub async fn stop_typing(&self) -> Result<()> {
		self.acknowledged(protocol::STOPPED_TYPING, &[]).await
	}

	/// Sends one chat message. Delivery is a single best-effort request.
	pub async fn send_message(&self, text: &str) -> Result<()> {
		if text.is_empty() {
			return Err(Error::InvalidArgument("message is empty"));
		}
		self.acknowledged(protocol::SEND, &[("msg", text)]).await
	}

	/// Leaves the conversation.
	///
	/// The stored identifier is kept; call [`establish`](Self::establish) to
	/// start over.
	pub async fn disconnect(&self) -> Result<()> {
		self.acknowledged(protocol::DISCONNECT, &[]).await?;
		info!(target = "om.session", "disconnected");
		Ok(())
	}

	/// Long-polls for events that accumulated since the last poll.
	pub async fn poll(&self) -> Result<Vec<Event>> {
		let session = self.active()?;
		let url = self.options.url(session.config.server.as_deref(), protocol::EVENTS);

		let body = self.transport.request(Method::Post, &url, &[("id", session.id.as_str())]).await?;
		trace!(target = "om.session", body = %body, "poll response");

		let events = protocol::decode_events(&body)?;
		debug!(target = "om.session", count = events.len(), "polled events");
		Ok(events)
	}

	/// Fetches service-wide counters. Does not need a session.
	pub async fn fetch_status(&self) -> Result<StatusRecord> {
		let config = self.identity.config();
		let url = self.options.url(config.server.as_deref(), protocol::STATUS);

		let body = self.transport.request(Method::Get, &url, &[("randid", self.random_id.as_str())]).await?;
		Ok(StatusRecord::parse(&body)?)
	}

	/// Stops waiting for a topic match and falls back to a random peer.
	pub async fn stop_looking_for_common_likes(&self) -> Result<()> {
		if !self.identity.config().has_topics() {
			return Err(Error::InvalidArgument("no topics configured"));
		}
		self.acknowledged(protocol::STOP_COMMON_LIKES, &[]).await
	}

	/// Answers a captcha challenge from a `recaptchaRequired` or
	/// `recaptchaRejected` event.
	pub async fn submit_captcha(&self, challenge: &str, response: &str) -> Result<()> {
		let session = self.active()?;
		let url = self.options.url(session.config.server.as_deref(), protocol::RECAPTCHA);

		let body = self
			.transport
			.request(Method::Post, &url, &[("id", session.id.as_str()), ("challenge", challenge), ("response", response)])
			.await?;
		if body.trim() == protocol::FAIL {
			return Err(Error::UnexpectedBody {
				command: protocol::RECAPTCHA,
				body,
			});
		}
		Ok(())
	}

	/// Renders a chat log image and returns its link.
	///
	/// `ident_digests` comes from the `identDigests` event of the
	/// conversation being logged.
	pub async fn generate_log(&self, ident_digests: &str, entries: &[LogEntry]) -> Result<String> {
		if ident_digests.trim().is_empty() {
			return Err(Error::InvalidArgument("identity digests are empty"));
		}
		let session = self.active()?;

		let topics = session.config.has_topics().then(|| serde_json::to_string(&session.config.topics)).transpose()?;
		let log = protocol::encode_log(entries);

		let mut params = vec![("randid", self.random_id.as_str()), ("identdigests", ident_digests), ("host", "1")];
		if let Some(topics) = &topics {
			params.push(("topics", topics.as_str()));
		}
		params.push(("log", log.as_str()));

		let url = self.options.log_url(protocol::GENERATE);
		let body = self.transport.request(Method::Post, &url, &params).await?;

		match LOG_LINK_RE.find(&body) {
			Some(link) => Ok(link.as_str().to_string()),
			None => Err(Error::UnexpectedBody {
				command: protocol::GENERATE,
				body,
			}),
		}
	}

	fn active(&self) -> Result<ActiveSession> {
		self.identity.active().ok_or(Error::NoSession)
	}

	// POSTs `command` with the session id plus `extra` and requires the
	// acknowledgement token back.
	async fn acknowledged(&self, command: &'static str, extra: &[(&str, &str)]) -> Result<()> {
		let session = self.active()?;
		let url = self.options.url(session.config.server.as_deref(), command);

		let mut params = Vec::with_capacity(extra.len() + 1);
		params.push(("id", session.id.as_str()));
		params.extend_from_slice(extra);

		let body = self.transport.request(Method::Post, &url, &params).await?;
		if body != protocol::ACK {
			return Err(Error::UnexpectedBody { command, body });
		}
		debug!(target = "om.session", command, "acknowledged");
		Ok(())
	}
}
