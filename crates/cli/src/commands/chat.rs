//! `om chat`: a poller and a sender sharing one session.
//!
//! The poller long-polls `/events`, prints what arrives and tracks the
//! [`SessionPhase`]. The sender relays stdin lines as messages or slash
//! commands. Whichever finishes first ends the chat.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use om::{Event, LogEntry, SessionConfig, SessionManager, SessionPhase};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::error::Result;
use crate::render::{self, Tone};

#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
	/// Establish a new session when the stranger leaves.
	pub reconnect: bool,
	/// Consecutive poll failures tolerated before giving up.
	pub max_retries: u32,
}

/// One line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
	Empty,
	Message(&'a str),
	Typing,
	StopTyping,
	Disconnect,
	NoLikes,
	Captcha { challenge: &'a str, response: &'a str },
	Log,
	Quit,
	Unknown(&'a str),
}

impl<'a> Input<'a> {
	/// Parses a line. A leading `//` sends a message starting with `/`.
	pub fn parse(line: &'a str) -> Self {
		let line = line.trim_end_matches(['\r', '\n']);
		if line.trim().is_empty() {
			return Self::Empty;
		}
		if line.starts_with("//") {
			return Self::Message(&line[1..]);
		}
		let Some(command) = line.strip_prefix('/') else {
			return Self::Message(line);
		};

		let (name, rest) = match command.split_once(char::is_whitespace) {
			Some((name, rest)) => (name, rest.trim()),
			None => (command, ""),
		};
		match name {
			"typing" => Self::Typing,
			"stoptyping" => Self::StopTyping,
			"disconnect" | "next" => Self::Disconnect,
			"nolikes" => Self::NoLikes,
			"log" => Self::Log,
			"quit" | "exit" => Self::Quit,
			"captcha" => match rest.split_once(char::is_whitespace) {
				Some((challenge, response)) if !response.trim().is_empty() => Self::Captcha {
					challenge,
					response: response.trim(),
				},
				_ => Self::Unknown(line),
			},
			_ => Self::Unknown(line),
		}
	}
}

/// Conversation so far, kept for `/log`.
#[derive(Debug, Default)]
pub struct Transcript {
	digests: Option<String>,
	entries: Vec<LogEntry>,
}

impl Transcript {
	pub fn record(&mut self, event: &Event) {
		let entry = match event {
			Event::IdentityDigest { digests } => {
				self.digests = Some(digests.clone());
				return;
			}
			Event::Connected => LogEntry::Notice("You're now chatting with a random stranger.".to_string()),
			Event::QuestionPosed { question } => LogEntry::Question(question.clone()),
			Event::MessageReceived { text } => LogEntry::Stranger(text.clone()),
			Event::CounterpartMessage { counterpart, text } => match counterpart.as_str() {
				"Stranger 1" => LogEntry::Stranger1(text.clone()),
				"Stranger 2" => LogEntry::Stranger2(text.clone()),
				_ => LogEntry::Line {
					label: format!("{counterpart}:"),
					text: text.clone(),
				},
			},
			Event::PeerDisconnected => LogEntry::Notice("Stranger has disconnected.".to_string()),
			Event::CounterpartDisconnected { counterpart } => LogEntry::Notice(format!("{counterpart} has disconnected.")),
			_ => return,
		};
		self.entries.push(entry);
	}

	pub fn record_sent(&mut self, text: &str) {
		self.entries.push(LogEntry::You(text.to_string()));
	}

	pub fn digests(&self) -> Option<&str> {
		self.digests.as_deref()
	}

	pub fn entries(&self) -> &[LogEntry] {
		&self.entries
	}

	pub fn clear(&mut self) {
		self.digests = None;
		self.entries.clear();
	}
}

pub async fn execute(manager: Arc<SessionManager>, config: SessionConfig, options: ChatOptions) -> Result<()> {
	manager.establish(config.clone()).await?;

	let transcript = Arc::new(Mutex::new(Transcript::default()));
	let (lines_tx, lines_rx) = mpsc::unbounded_channel();
	spawn_stdin_reader(lines_tx)?;

	let mut poller = tokio::spawn(poll_loop(Arc::clone(&manager), config.clone(), options, Arc::clone(&transcript)));
	let mut sender = tokio::spawn(send_loop(Arc::clone(&manager), lines_rx, config, options, transcript));

	let outcome = tokio::select! {
		joined = &mut poller => joined,
		joined = &mut sender => joined,
		signal = tokio::signal::ctrl_c() => {
			signal?;
			Ok(Ok(()))
		}
	};
	poller.abort();
	sender.abort();

	if let Err(err) = manager.disconnect().await {
		debug!(target = "om", error = %err, "disconnect on exit failed");
	}
	outcome?
}

// Plain thread: a pending tokio stdin read would block runtime shutdown.
fn spawn_stdin_reader(lines: mpsc::UnboundedSender<String>) -> io::Result<()> {
	thread::Builder::new().name("om-stdin".into()).spawn(move || {
		for line in io::stdin().lock().lines() {
			let Ok(line) = line else { break };
			if lines.send(line).is_err() {
				break;
			}
		}
	})?;
	Ok(())
}

/// Polls until the conversation ends for good.
///
/// Terminal events either end the loop or, with `reconnect`, start a new
/// session. Transport and decode failures are retried with backoff.
pub async fn poll_loop(manager: Arc<SessionManager>, config: SessionConfig, options: ChatOptions, transcript: Arc<Mutex<Transcript>>) -> Result<()> {
	let mut phase = SessionPhase::established();
	let mut backoff = Backoff::default();

	loop {
		let events = match manager.poll().await {
			Ok(events) => {
				backoff.reset();
				events
			}
			Err(err) if err.is_transport() || err.is_decode() => {
				if backoff.attempt() >= options.max_retries {
					return Err(err.into());
				}
				let delay = backoff.next_delay();
				warn!(target = "om", error = %err, attempt = backoff.attempt(), delay_ms = delay.as_millis() as u64, "poll failed, retrying");
				tokio::time::sleep(delay).await;
				continue;
			}
			Err(err) => return Err(err.into()),
		};

		for event in &events {
			transcript.lock().await.record(event);
			render::print_event(event);
			phase = phase.apply(event);
		}

		match phase {
			SessionPhase::Banned => return Ok(()),
			SessionPhase::Idle if options.reconnect => {
				manager.establish(config.clone()).await?;
				transcript.lock().await.clear();
				phase = SessionPhase::established();
				info!(target = "om", "re-established after conversation ended");
			}
			SessionPhase::Idle => return Ok(()),
			SessionPhase::Waiting | SessionPhase::Connected => {}
		}
	}
}

enum Flow {
	Continue,
	Stop,
}

/// Relays user input until `/quit`, end of input, or a final `/disconnect`.
pub async fn send_loop(
	manager: Arc<SessionManager>,
	mut lines: mpsc::UnboundedReceiver<String>,
	config: SessionConfig,
	options: ChatOptions,
	transcript: Arc<Mutex<Transcript>>,
) -> Result<()> {
	while let Some(line) = lines.recv().await {
		let input = Input::parse(&line);
		match input {
			Input::Empty => continue,
			Input::Quit => break,
			Input::Unknown(text) => {
				render::print_line(Tone::Alert, &format!("Unknown command: {text}"));
				continue;
			}
			_ => {}
		}

		match perform(&manager, input, &config, options, &transcript).await {
			Ok(Flow::Continue) => {}
			Ok(Flow::Stop) => break,
			Err(err) => {
				warn!(target = "om", error = %err, "action failed");
				render::print_line(Tone::Alert, &format!("Failed: {err}"));
			}
		}
	}
	Ok(())
}

async fn perform(manager: &SessionManager, input: Input<'_>, config: &SessionConfig, options: ChatOptions, transcript: &Mutex<Transcript>) -> om::Result<Flow> {
	match input {
		Input::Message(text) => {
			manager.send_message(text).await?;
			transcript.lock().await.record_sent(text);
		}
		Input::Typing => manager.show_typing().await?,
		Input::StopTyping => manager.stop_typing().await?,
		Input::NoLikes => manager.stop_looking_for_common_likes().await?,
		Input::Captcha { challenge, response } => manager.submit_captcha(challenge, response).await?,
		Input::Log => {
			let (digests, entries) = {
				let transcript = transcript.lock().await;
				(transcript.digests().map(str::to_string), transcript.entries().to_vec())
			};
			let Some(digests) = digests else {
				render::print_line(Tone::Alert, "Nothing to log yet.");
				return Ok(Flow::Continue);
			};
			let link = manager.generate_log(&digests, &entries).await?;
			render::print_line(Tone::Notice, &format!("Log: {link}"));
		}
		Input::Disconnect => {
			manager.disconnect().await?;
			if !options.reconnect {
				return Ok(Flow::Stop);
			}
			transcript.lock().await.clear();
			manager.establish(config.clone()).await?;
		}
		Input::Empty | Input::Quit | Input::Unknown(_) => {}
	}
	Ok(Flow::Continue)
}
