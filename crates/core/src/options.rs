//! Where the service lives.

use serde::{Deserialize, Serialize};

/// Host and scheme used to build endpoint URLs.
///
/// Endpoint URLs are `{scheme}://{server.}{host}/{command}`, where `server`
/// is the optional pin from the session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
	pub scheme: String,
	pub host: String,
	/// Host of the chat-log renderer.
	pub log_host: String,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			scheme: "http".to_string(),
			host: "omegle.com".to_string(),
			log_host: "logs.omegle.com".to_string(),
		}
	}
}

impl ClientOptions {
	/// URL of `command`, optionally on a pinned front server.
	pub fn url(&self, server: Option<&str>, command: &str) -> String {
		match server.filter(|s| !s.is_empty()) {
			Some(server) => format!("{}://{}.{}/{}", self.scheme, server, self.host, command),
			None => format!("{}://{}/{}", self.scheme, self.host, command),
		}
	}

	/// URL of `command` on the log renderer.
	pub fn log_url(&self, command: &str) -> String {
		format!("{}://{}/{}", self.scheme, self.log_host, command)
	}
}
