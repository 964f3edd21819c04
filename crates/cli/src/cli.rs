use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "om")]
#[command(about = "Talk to strangers from the terminal")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Service host
	#[arg(long, global = true, default_value = "omegle.com")]
	pub host: String,

	/// Host that renders chat log images
	#[arg(long, global = true, default_value = "logs.omegle.com")]
	pub log_host: String,

	/// Use https instead of http
	#[arg(long, global = true)]
	pub https: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Start a conversation and relay stdin to it
	Chat(ChatArgs),

	/// Show service-wide counters
	Status {
		/// Print the raw record as JSON
		#[arg(long)]
		json: bool,
	},
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
	/// Session config file (JSON); flags override its values
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Two-letter language code
	#[arg(long)]
	pub lang: Option<String>,

	/// Group tag, e.g. unmon
	#[arg(long)]
	pub group: Option<String>,

	/// Front server to pin the session to
	#[arg(long)]
	pub server: Option<String>,

	/// Interest to match on (repeatable)
	#[arg(long = "topic", value_name = "TOPIC")]
	pub topics: Vec<String>,

	/// Ask a question and watch two strangers discuss it
	#[arg(long, conflicts_with_all = ["spy", "college"])]
	pub question: Option<String>,

	/// Let the service reuse the question
	#[arg(long, requires = "question")]
	pub can_save_question: bool,

	/// Offer to discuss other users' questions
	#[arg(long, conflicts_with = "college")]
	pub spy: bool,

	/// Institution domain for college chat
	#[arg(long, requires = "college_auth")]
	pub college: Option<String>,

	/// Institution auth token
	#[arg(long, requires = "college")]
	pub college_auth: Option<String>,

	/// Match with members of any institution
	#[arg(long, requires = "college")]
	pub any_college: bool,

	/// Start a new conversation when the stranger leaves
	#[arg(long)]
	pub reconnect: bool,

	/// Poll failures tolerated in a row before giving up
	#[arg(long, default_value_t = 5)]
	pub max_retries: u32,
}
