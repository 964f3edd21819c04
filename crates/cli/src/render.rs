//! Terminal rendering of chat events.

use colored::Colorize;
use om::{Event, StatusRecord};

/// How a rendered line is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
	/// Service notices and state changes.
	Notice,
	/// Words from the other side.
	Peer,
	/// Something the user must act on.
	Alert,
}

/// Human-readable line for an event, or `None` for events that are not shown.
pub fn describe(event: &Event) -> Option<(Tone, String)> {
	let line = match event {
		Event::WaitingForMatch => (Tone::Notice, "Looking for someone you can chat with...".to_string()),
		Event::Connected => (Tone::Notice, "You're now chatting with a random stranger. Say hi!".to_string()),
		Event::PeerDisconnected => (Tone::Notice, "Stranger has disconnected.".to_string()),
		Event::PeerTyping => (Tone::Notice, "Stranger is typing...".to_string()),
		Event::MessageReceived { text } => (Tone::Peer, format!("Stranger: {text}")),
		Event::ConnectionError { message } => (Tone::Alert, format!("Error: {message}")),
		Event::ConnectionDied => (Tone::Alert, "The connection to the server died.".to_string()),
		Event::BannedForAbuse => (Tone::Alert, "You have been banned. Try another group.".to_string()),
		Event::QuestionPosed { question } => (Tone::Notice, format!("Question to discuss: {question}")),
		Event::CounterpartTyping { counterpart } => (Tone::Notice, format!("{counterpart} is typing...")),
		Event::CounterpartDisconnected { counterpart } => (Tone::Notice, format!("{counterpart} has disconnected.")),
		Event::CounterpartMessage { counterpart, text } => (Tone::Peer, format!("{counterpart}: {text}")),
		Event::ServerBroadcast { message } => (Tone::Notice, format!("Server: {message}")),
		Event::SharedTopics { topics } if !topics.is_empty() => (Tone::Notice, format!("You both like {}.", topics.join(", "))),
		Event::CaptchaRequired { challenge } => (Tone::Alert, format!("Captcha required, answer with: /captcha {challenge} <response>")),
		Event::CaptchaRejected { challenge } => (Tone::Alert, format!("Captcha rejected, try again: /captcha {challenge} <response>")),
		Event::PeerInstitutionName { institution } => (Tone::Notice, format!("Stranger is from {institution}.")),
		Event::PeerStoppedTyping
		| Event::CounterpartStoppedTyping { .. }
		| Event::IdentityDigest { .. }
		| Event::OnlineCountUpdate
		| Event::SharedTopics { .. }
		| Event::StatusSnapshot { .. } => return None,
	};
	Some(line)
}

pub fn print_line(tone: Tone, line: &str) {
	match tone {
		Tone::Notice => println!("{}", line.dimmed()),
		Tone::Peer => println!("{}", line.red()),
		Tone::Alert => println!("{}", line.yellow().bold()),
	}
}

pub fn print_event(event: &Event) {
	if let Some((tone, line)) = describe(event) {
		print_line(tone, &line);
	}
}

/// Plain-text status summary.
pub fn status_summary(status: &StatusRecord) -> String {
	format!(
		"online:          {}\nforce unmon:     {}\nspy queue:       {:.2}s\nspyee queue:     {:.2}s\nservers:         {}\nantinude:        {} ({:.2})",
		status.count,
		status.force_unmon,
		status.spy_queue_time,
		status.spyee_queue_time,
		status.servers.join(", "),
		status.antinude_servers.join(", "),
		status.antinude_percent,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_are_attributed() {
		let (tone, line) = describe(&Event::MessageReceived { text: "hi".into() }).unwrap();
		assert_eq!(tone, Tone::Peer);
		assert_eq!(line, "Stranger: hi");

		let (_, line) = describe(&Event::CounterpartMessage {
			counterpart: "Stranger 2".into(),
			text: "yo".into(),
		})
		.unwrap();
		assert_eq!(line, "Stranger 2: yo");
	}

	#[test]
	fn bookkeeping_events_are_hidden() {
		assert!(describe(&Event::OnlineCountUpdate).is_none());
		assert!(describe(&Event::IdentityDigest { digests: "a,b".into() }).is_none());
		assert!(describe(&Event::SharedTopics { topics: vec![] }).is_none());
	}

	#[test]
	fn captcha_prompt_shows_the_command() {
		let (tone, line) = describe(&Event::CaptchaRequired { challenge: "key123".into() }).unwrap();
		assert_eq!(tone, Tone::Alert);
		assert!(line.contains("/captcha key123"));
	}

	#[test]
	fn status_summary_lists_servers() {
		let status = StatusRecord {
			count: 42,
			force_unmon: false,
			antinude_servers: vec!["waw1".into()],
			antinude_percent: 1.0,
			spyee_queue_time: 0.5,
			spy_queue_time: 0.25,
			timestamp: 0.0,
			servers: vec!["front1".into(), "front2".into()],
		};

		let summary = status_summary(&status);
		assert!(summary.contains("online:          42"));
		assert!(summary.contains("front1, front2"));
	}
}
