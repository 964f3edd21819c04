//! Session configuration from an optional JSON file plus `chat` flags.

use std::fs;
use std::path::Path;

use om::{ClientOptions, Mode, SessionConfig};

use crate::cli::{ChatArgs, Cli};
use crate::error::{CliError, Result};

/// Connection options from the global flags.
pub fn client_options(cli: &Cli) -> ClientOptions {
	ClientOptions {
		scheme: if cli.https { "https" } else { "http" }.to_string(),
		host: cli.host.clone(),
		log_host: cli.log_host.clone(),
	}
}

/// Reads a [`SessionConfig`] from a JSON file.
pub fn load_file(path: &Path) -> Result<SessionConfig> {
	let text = fs::read_to_string(path).map_err(|err| CliError::Config {
		path: path.to_path_buf(),
		reason: err.to_string(),
	})?;
	serde_json::from_str(&text).map_err(|err| CliError::Config {
		path: path.to_path_buf(),
		reason: err.to_string(),
	})
}

/// Builds the session config: file values first, then explicit flags.
pub fn session_config(args: &ChatArgs) -> Result<SessionConfig> {
	let mut config = match &args.config {
		Some(path) => load_file(path)?,
		None => SessionConfig::default(),
	};

	if let Some(lang) = &args.lang {
		config.lang = lang.clone();
	}
	if let Some(group) = &args.group {
		config.group = Some(group.clone());
	}
	if let Some(server) = &args.server {
		config.server = Some(server.clone());
	}
	if !args.topics.is_empty() {
		config.topics = args.topics.clone();
	}
	if let Some(mode) = mode_from_flags(args) {
		config.mode = mode;
	}
	Ok(config)
}

fn mode_from_flags(args: &ChatArgs) -> Option<Mode> {
	if let Some(text) = &args.question {
		return Some(Mode::Question {
			text: text.clone(),
			can_save: args.can_save_question,
		});
	}
	if args.spy {
		return Some(Mode::Spy);
	}
	match (&args.college, &args.college_auth) {
		(Some(college), Some(auth)) => Some(Mode::Institution {
			college: college.clone(),
			auth: auth.clone(),
			any_college: args.any_college,
		}),
		_ => None,
	}
}
