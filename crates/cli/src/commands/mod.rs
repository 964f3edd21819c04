mod chat;
mod status;

use std::sync::Arc;

use om::SessionManager;

use crate::cli::{Cli, Commands};
use crate::config;
use crate::error::Result;

pub use chat::{ChatOptions, Input, Transcript};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let manager = Arc::new(SessionManager::builder().options(config::client_options(&cli)).build());

	match cli.command {
		Commands::Chat(args) => {
			let session = config::session_config(&args)?;
			let options = ChatOptions {
				reconnect: args.reconnect,
				max_retries: args.max_retries,
			};
			chat::execute(manager, session, options).await
		}
		Commands::Status { json } => status::execute(&manager, json).await,
	}
}
