//! Discriminated events produced by the `/events` decoder.

use std::fmt;

use serde::Serialize;

use crate::status::StatusRecord;

/// The closed set of event kinds the service emits.
///
/// Each kind maps to exactly one wire discriminant (the first element of a
/// polled tuple).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
	WaitingForMatch,
	Connected,
	PeerDisconnected,
	PeerTyping,
	PeerStoppedTyping,
	MessageReceived,
	ConnectionError,
	IdentityDigest,
	ConnectionDied,
	BannedForAbuse,
	QuestionPosed,
	CounterpartTyping,
	CounterpartStoppedTyping,
	CounterpartDisconnected,
	CounterpartMessage,
	ServerBroadcast,
	OnlineCountUpdate,
	SharedTopics,
	CaptchaRequired,
	CaptchaRejected,
	PeerInstitutionName,
	StatusSnapshot,
}

impl EventKind {
	/// Every kind, in declaration order.
	pub const ALL: [EventKind; 22] = [
		Self::WaitingForMatch,
		Self::Connected,
		Self::PeerDisconnected,
		Self::PeerTyping,
		Self::PeerStoppedTyping,
		Self::MessageReceived,
		Self::ConnectionError,
		Self::IdentityDigest,
		Self::ConnectionDied,
		Self::BannedForAbuse,
		Self::QuestionPosed,
		Self::CounterpartTyping,
		Self::CounterpartStoppedTyping,
		Self::CounterpartDisconnected,
		Self::CounterpartMessage,
		Self::ServerBroadcast,
		Self::OnlineCountUpdate,
		Self::SharedTopics,
		Self::CaptchaRequired,
		Self::CaptchaRejected,
		Self::PeerInstitutionName,
		Self::StatusSnapshot,
	];

	/// Looks up the kind for a wire discriminant.
	pub fn from_discriminant(tag: &str) -> Option<Self> {
		let kind = match tag {
			"waiting" => Self::WaitingForMatch,
			"connected" => Self::Connected,
			"strangerDisconnected" => Self::PeerDisconnected,
			"typing" => Self::PeerTyping,
			"stoppedTyping" => Self::PeerStoppedTyping,
			"gotMessage" => Self::MessageReceived,
			"error" => Self::ConnectionError,
			"identDigests" => Self::IdentityDigest,
			"connectionDied" => Self::ConnectionDied,
			"antinudeBanned" => Self::BannedForAbuse,
			"question" => Self::QuestionPosed,
			"spyTyping" => Self::CounterpartTyping,
			"spyStoppedTyping" => Self::CounterpartStoppedTyping,
			"spyDisconnected" => Self::CounterpartDisconnected,
			"spyMessage" => Self::CounterpartMessage,
			"serverMessage" => Self::ServerBroadcast,
			"count" => Self::OnlineCountUpdate,
			"commonLikes" => Self::SharedTopics,
			"recaptchaRequired" => Self::CaptchaRequired,
			"recaptchaRejected" => Self::CaptchaRejected,
			"partnerCollege" => Self::PeerInstitutionName,
			"statusInfo" => Self::StatusSnapshot,
			_ => return None,
		};
		Some(kind)
	}

	/// The wire discriminant for this kind.
	pub fn discriminant(self) -> &'static str {
		match self {
			Self::WaitingForMatch => "waiting",
			Self::Connected => "connected",
			Self::PeerDisconnected => "strangerDisconnected",
			Self::PeerTyping => "typing",
			Self::PeerStoppedTyping => "stoppedTyping",
			Self::MessageReceived => "gotMessage",
			Self::ConnectionError => "error",
			Self::IdentityDigest => "identDigests",
			Self::ConnectionDied => "connectionDied",
			Self::BannedForAbuse => "antinudeBanned",
			Self::QuestionPosed => "question",
			Self::CounterpartTyping => "spyTyping",
			Self::CounterpartStoppedTyping => "spyStoppedTyping",
			Self::CounterpartDisconnected => "spyDisconnected",
			Self::CounterpartMessage => "spyMessage",
			Self::ServerBroadcast => "serverMessage",
			Self::OnlineCountUpdate => "count",
			Self::SharedTopics => "commonLikes",
			Self::CaptchaRequired => "recaptchaRequired",
			Self::CaptchaRejected => "recaptchaRejected",
			Self::PeerInstitutionName => "partnerCollege",
			Self::StatusSnapshot => "statusInfo",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.discriminant())
	}
}

/// One decoded event with its payload.
///
/// Events have no identity beyond their position in a poll response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Event {
	WaitingForMatch,
	Connected,
	PeerDisconnected,
	PeerTyping,
	PeerStoppedTyping,
	MessageReceived { text: String },
	ConnectionError { message: String },
	IdentityDigest { digests: String },
	ConnectionDied,
	BannedForAbuse,
	QuestionPosed { question: String },
	CounterpartTyping { counterpart: String },
	CounterpartStoppedTyping { counterpart: String },
	CounterpartDisconnected { counterpart: String },
	CounterpartMessage { counterpart: String, text: String },
	ServerBroadcast { message: String },
	OnlineCountUpdate,
	SharedTopics { topics: Vec<String> },
	CaptchaRequired { challenge: String },
	CaptchaRejected { challenge: String },
	PeerInstitutionName { institution: String },
	StatusSnapshot { status: StatusRecord },
}

impl Event {
	/// The kind of this event.
	pub fn kind(&self) -> EventKind {
		match self {
			Self::WaitingForMatch => EventKind::WaitingForMatch,
			Self::Connected => EventKind::Connected,
			Self::PeerDisconnected => EventKind::PeerDisconnected,
			Self::PeerTyping => EventKind::PeerTyping,
			Self::PeerStoppedTyping => EventKind::PeerStoppedTyping,
			Self::MessageReceived { .. } => EventKind::MessageReceived,
			Self::ConnectionError { .. } => EventKind::ConnectionError,
			Self::IdentityDigest { .. } => EventKind::IdentityDigest,
			Self::ConnectionDied => EventKind::ConnectionDied,
			Self::BannedForAbuse => EventKind::BannedForAbuse,
			Self::QuestionPosed { .. } => EventKind::QuestionPosed,
			Self::CounterpartTyping { .. } => EventKind::CounterpartTyping,
			Self::CounterpartStoppedTyping { .. } => EventKind::CounterpartStoppedTyping,
			Self::CounterpartDisconnected { .. } => EventKind::CounterpartDisconnected,
			Self::CounterpartMessage { .. } => EventKind::CounterpartMessage,
			Self::ServerBroadcast { .. } => EventKind::ServerBroadcast,
			Self::OnlineCountUpdate => EventKind::OnlineCountUpdate,
			Self::SharedTopics { .. } => EventKind::SharedTopics,
			Self::CaptchaRequired { .. } => EventKind::CaptchaRequired,
			Self::CaptchaRejected { .. } => EventKind::CaptchaRejected,
			Self::PeerInstitutionName { .. } => EventKind::PeerInstitutionName,
			Self::StatusSnapshot { .. } => EventKind::StatusSnapshot,
		}
	}

	/// String payload fields in wire order.
	///
	/// Empty for kinds without a payload and for status snapshots, which
	/// carry a structured record instead (see [`Event::status`]).
	pub fn fields(&self) -> Vec<&str> {
		match self {
			Self::MessageReceived { text } => vec![text.as_str()],
			Self::ConnectionError { message } | Self::ServerBroadcast { message } => vec![message.as_str()],
			Self::IdentityDigest { digests } => vec![digests.as_str()],
			Self::QuestionPosed { question } => vec![question.as_str()],
			Self::CounterpartTyping { counterpart } | Self::CounterpartStoppedTyping { counterpart } | Self::CounterpartDisconnected { counterpart } => {
				vec![counterpart.as_str()]
			}
			Self::CounterpartMessage { counterpart, text } => vec![counterpart.as_str(), text.as_str()],
			Self::SharedTopics { topics } => topics.iter().map(String::as_str).collect(),
			Self::CaptchaRequired { challenge } | Self::CaptchaRejected { challenge } => vec![challenge.as_str()],
			Self::PeerInstitutionName { institution } => vec![institution.as_str()],
			Self::WaitingForMatch
			| Self::Connected
			| Self::PeerDisconnected
			| Self::PeerTyping
			| Self::PeerStoppedTyping
			| Self::ConnectionDied
			| Self::BannedForAbuse
			| Self::OnlineCountUpdate
			| Self::StatusSnapshot { .. } => Vec::new(),
		}
	}

	/// The status record carried by a status snapshot.
	pub fn status(&self) -> Option<&StatusRecord> {
		match self {
			Self::StatusSnapshot { status } => Some(status),
			_ => None,
		}
	}

	/// True for events after which the session identifier is no longer usable.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::PeerDisconnected | Self::ConnectionDied | Self::BannedForAbuse)
	}
}

/// Session phase as observed through the event stream.
///
/// ```text
/// Idle -> (establish) -> Waiting <-> Connected -> (disconnect | died | banned) -> Idle
/// ```
///
/// `Banned` is sticky: only a fresh establishment with a different group or
/// mode leaves it, which callers express by starting again from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
	#[default]
	Idle,
	Waiting,
	Connected,
	Banned,
}

impl SessionPhase {
	/// Phase right after a successful establishment.
	pub fn established() -> Self {
		Self::Waiting
	}

	/// Applies one event and returns the next phase.
	pub fn apply(self, event: &Event) -> Self {
		if self == Self::Banned {
			return self;
		}
		match event {
			Event::BannedForAbuse => Self::Banned,
			Event::PeerDisconnected | Event::ConnectionDied => Self::Idle,
			Event::WaitingForMatch => Self::Waiting,
			Event::Connected => Self::Connected,
			_ => self,
		}
	}

	/// True when a session identifier is in use for this phase.
	pub fn is_live(self) -> bool {
		matches!(self, Self::Waiting | Self::Connected)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn discriminants_round_trip_for_every_kind() {
		for kind in EventKind::ALL {
			assert_eq!(EventKind::from_discriminant(kind.discriminant()), Some(kind));
		}
	}

	#[test]
	fn unknown_discriminant_is_rejected() {
		assert_eq!(EventKind::from_discriminant("bogusKind"), None);
		assert_eq!(EventKind::from_discriminant("Connected"), None);
	}

	#[test]
	fn counterpart_message_fields_keep_wire_order() {
		let event = Event::CounterpartMessage {
			counterpart: "Alice".into(),
			text: "hello".into(),
		};
		assert_eq!(event.kind(), EventKind::CounterpartMessage);
		assert_eq!(event.fields(), vec!["Alice", "hello"]);
	}

	#[test]
	fn phase_follows_connection_lifecycle() {
		let phase = SessionPhase::established();
		let phase = phase.apply(&Event::Connected);
		assert_eq!(phase, SessionPhase::Connected);

		let phase = phase.apply(&Event::PeerTyping).apply(&Event::MessageReceived { text: "hi".into() });
		assert_eq!(phase, SessionPhase::Connected);

		let phase = phase.apply(&Event::PeerDisconnected);
		assert_eq!(phase, SessionPhase::Idle);
		assert!(!phase.is_live());
	}

	#[test]
	fn banned_is_sticky() {
		let phase = SessionPhase::Connected.apply(&Event::BannedForAbuse);
		assert_eq!(phase, SessionPhase::Banned);
		assert_eq!(phase.apply(&Event::Connected), SessionPhase::Banned);
		assert!(Event::BannedForAbuse.is_terminal());
	}
}
