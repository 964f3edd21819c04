//! Session establishment parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Matchmaking mode for a session.
///
/// Modes are mutually exclusive; each carries only the fields it uses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mode {
	/// One-on-one chat, optionally matched on topics.
	#[default]
	Plain,
	/// Offer to answer other users' questions as one of two spectated strangers.
	Spy,
	/// Ask a question and watch two strangers discuss it.
	Question {
		text: String,
		/// Lets the service reuse the question for others.
		#[serde(default)]
		can_save: bool,
	},
	/// Chat restricted to verified members of an institution.
	Institution {
		college: String,
		auth: String,
		/// Match with members of any institution, not just `college`.
		#[serde(default)]
		any_college: bool,
	},
}

impl Mode {
	/// Short name used in logs.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Plain => "plain",
			Self::Spy => "spy",
			Self::Question { .. } => "question",
			Self::Institution { .. } => "institution",
		}
	}

	/// True for modes that send the topic list with the establishment request.
	pub fn uses_topics(&self) -> bool {
		matches!(self, Self::Plain | Self::Institution { .. })
	}
}

/// Immutable configuration for one establishment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
	/// Two-letter language code.
	pub lang: String,
	/// Group tag, e.g. `unmon`.
	pub group: Option<String>,
	/// Front server to pin the session to (subdomain of the service host).
	pub server: Option<String>,
	/// Interests used for matchmaking. Ignored by spy and question modes.
	pub topics: Vec<String>,
	pub mode: Mode,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			lang: "en".to_string(),
			group: None,
			server: None,
			topics: Vec::new(),
			mode: Mode::Plain,
		}
	}
}

impl SessionConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = lang.into();
		self
	}

	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn with_server(mut self, server: impl Into<String>) -> Self {
		self.server = Some(server.into());
		self
	}

	pub fn with_topics<I, S>(mut self, topics: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.topics = topics.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_mode(mut self, mode: Mode) -> Self {
		self.mode = mode;
		self
	}

	/// True when topics are configured and the mode sends them.
	pub fn has_topics(&self) -> bool {
		self.mode.uses_topics() && !self.topics.is_empty()
	}

	/// Builds the `/start` query parameters.
	///
	/// Order: `lang`, `group` (when set), `randid`, the mode's own fields,
	/// then `topics` as a JSON array when the mode uses them.
	///
	/// A blank question text, institution or auth token is
	/// [`Error::InvalidArgument`].
	pub fn establishment_params(&self, random_id: &str) -> Result<Vec<(&'static str, String)>> {
		let mut params = vec![("lang", self.lang.clone())];
		if let Some(group) = &self.group {
			params.push(("group", group.clone()));
		}
		params.push(("randid", random_id.to_string()));

		match &self.mode {
			Mode::Plain => {}
			Mode::Spy => params.push(("wantsspy", "1".to_string())),
			Mode::Question { text, can_save } => {
				if text.trim().is_empty() {
					return Err(Error::InvalidArgument("question text is empty"));
				}
				params.push(("ask", text.clone()));
				if *can_save {
					params.push(("cansavequestion", "1".to_string()));
				}
			}
			Mode::Institution { college, auth, any_college } => {
				if college.trim().is_empty() {
					return Err(Error::InvalidArgument("institution is empty"));
				}
				if auth.trim().is_empty() {
					return Err(Error::InvalidArgument("institution auth token is empty"));
				}
				params.push(("college", college.clone()));
				params.push(("college_auth", auth.clone()));
				if *any_college {
					params.push(("any_college", "1".to_string()));
				}
			}
		}

		if self.has_topics() {
			params.push(("topics", serde_json::to_string(&self.topics)?));
		}
		Ok(params)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(params: &[(&'static str, String)]) -> Vec<&'static str> {
		params.iter().map(|(name, _)| *name).collect()
	}

	#[test]
	fn plain_mode_sends_topics_as_json() {
		let config = SessionConfig::new().with_topics(["pizza", "rust"]);
		let params = config.establishment_params("ABCD2345").unwrap();

		assert_eq!(names(&params), vec!["lang", "randid", "topics"]);
		assert_eq!(params[2].1, r#"["pizza","rust"]"#);
	}

	#[test]
	fn plain_mode_without_topics_omits_them() {
		let params = SessionConfig::new().with_group("unmon").establishment_params("ABCD2345").unwrap();
		assert_eq!(names(&params), vec!["lang", "group", "randid"]);
		assert_eq!(params[1].1, "unmon");
	}

	#[test]
	fn spy_mode_ignores_topics() {
		let config = SessionConfig::new().with_topics(["pizza"]).with_mode(Mode::Spy);
		let params = config.establishment_params("R").unwrap();

		assert_eq!(names(&params), vec!["lang", "randid", "wantsspy"]);
		assert!(!config.has_topics());
	}

	#[test]
	fn question_mode_sends_question_and_save_flag() {
		let config = SessionConfig::new().with_mode(Mode::Question {
			text: "cats or dogs?".into(),
			can_save: true,
		});
		let params = config.establishment_params("R").unwrap();

		assert_eq!(names(&params), vec!["lang", "randid", "ask", "cansavequestion"]);
		assert_eq!(params[2].1, "cats or dogs?");
	}

	#[test]
	fn institution_mode_sends_credentials_and_topics() {
		let config = SessionConfig::new().with_topics(["math"]).with_mode(Mode::Institution {
			college: "ktu.edu".into(),
			auth: "token".into(),
			any_college: true,
		});
		let params = config.establishment_params("R").unwrap();

		assert_eq!(names(&params), vec!["lang", "randid", "college", "college_auth", "any_college", "topics"]);
	}

	#[test]
	fn blank_question_or_credentials_are_rejected() {
		let blank_question = SessionConfig::new().with_mode(Mode::Question {
			text: String::new(),
			can_save: true,
		});
		assert!(blank_question.establishment_params("R").unwrap_err().is_invalid_argument());

		for (college, auth) in [("", "token"), ("ktu.edu", ""), ("ktu.edu", "   ")] {
			let config = SessionConfig::new().with_mode(Mode::Institution {
				college: college.into(),
				auth: auth.into(),
				any_college: false,
			});
			assert!(config.establishment_params("R").unwrap_err().is_invalid_argument(), "{college:?}/{auth:?}");
		}
	}

	#[test]
	fn deserializes_tagged_mode() {
		let config: SessionConfig = serde_json::from_str(r#"{"lang":"lt","mode":{"type":"question","text":"why?"}}"#).unwrap();
		assert_eq!(config.lang, "lt");
		assert_eq!(
			config.mode,
			Mode::Question {
				text: "why?".into(),
				can_save: false
			}
		);
		assert!(config.topics.is_empty());
	}
}
