use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Client(#[from] om::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("config {path}: {reason}")]
	Config { path: PathBuf, reason: String },

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("chat task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CliError>;
