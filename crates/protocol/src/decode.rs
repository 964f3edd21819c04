//! Decoder for `/events` and `/start` response bodies.
//!
//! A poll body is a JSON array of tuples shaped `[discriminant, ...fields]`.
//! The decoder applies two policies:
//!
//! * **Tuple leniency**: a tuple that cannot be decoded is dropped and the
//!   rest of the batch is kept (see [`SkipReason`]). Inside a `gotMessage`
//!   batch, a single message that fails unescaping is dropped on its own.
//! * **Batch strictness**: a non-trivial body that yields no events at all is
//!   a [`DecodeError::UnknownShape`].
//!
//! `[]` and `null` are the two "nothing happened" bodies and decode to an
//! empty sequence.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::{DecodeError, Result};
use crate::event::{Event, EventKind};
use crate::status::StatusRecord;

/// Why a single tuple was dropped.
#[derive(Debug)]
pub enum SkipReason {
	/// The element is not an array.
	NotATuple,
	/// The first element is missing or not a string.
	MissingDiscriminant,
	/// The discriminant is not in the closed set.
	UnknownDiscriminant(String),
	/// A required payload element is missing or has an unusable type.
	MissingField { kind: EventKind, index: usize },
	/// The embedded status record is incomplete.
	InvalidStatus(DecodeError),
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotATuple => f.write_str("element is not a tuple"),
			Self::MissingDiscriminant => f.write_str("missing discriminant"),
			Self::UnknownDiscriminant(tag) => write!(f, "unknown discriminant {tag:?}"),
			Self::MissingField { kind, index } => write!(f, "{kind}: missing field {index}"),
			Self::InvalidStatus(err) => write!(f, "statusInfo: {err}"),
		}
	}
}

/// Decodes one poll response body into events, in wire order.
pub fn decode_events(body: &str) -> Result<Vec<Event>> {
	let trimmed = body.trim();
	if trimmed == "[]" || trimmed == "null" {
		return Ok(Vec::new());
	}

	let root: Value = serde_json::from_str(trimmed).map_err(|source| DecodeError::Json {
		body: body.to_string(),
		source,
	})?;
	let tuples = match root {
		Value::Array(tuples) => tuples,
		Value::Null => return Ok(Vec::new()),
		_ => return Err(DecodeError::MalformedRoot { body: body.to_string() }),
	};
	if tuples.is_empty() {
		return Ok(Vec::new());
	}

	let mut events = Vec::with_capacity(tuples.len());
	for tuple in &tuples {
		match decode_tuple(tuple) {
			Ok(decoded) => events.extend(decoded),
			Err(reason) => debug!(target = "om.decode", %reason, "dropping tuple"),
		}
	}

	if events.is_empty() {
		return Err(DecodeError::UnknownShape { body: body.to_string() });
	}
	Ok(events)
}

/// Decodes a single tuple.
///
/// Returns more than one event only for `gotMessage` tuples carrying a
/// nested array of messages.
pub fn decode_tuple(tuple: &Value) -> std::result::Result<Vec<Event>, SkipReason> {
	let fields = tuple.as_array().ok_or(SkipReason::NotATuple)?;
	let tag = fields.first().and_then(Value::as_str).ok_or(SkipReason::MissingDiscriminant)?;
	let kind = EventKind::from_discriminant(tag).ok_or_else(|| SkipReason::UnknownDiscriminant(tag.to_string()))?;

	let text_at = |index: usize| fields.get(index).and_then(scalar_text).ok_or(SkipReason::MissingField { kind, index });

	let event = match kind {
		EventKind::WaitingForMatch => Event::WaitingForMatch,
		EventKind::Connected => Event::Connected,
		EventKind::PeerDisconnected => Event::PeerDisconnected,
		EventKind::PeerTyping => Event::PeerTyping,
		EventKind::PeerStoppedTyping => Event::PeerStoppedTyping,
		EventKind::ConnectionDied => Event::ConnectionDied,
		EventKind::BannedForAbuse => Event::BannedForAbuse,
		EventKind::OnlineCountUpdate => Event::OnlineCountUpdate,
		EventKind::ConnectionError => Event::ConnectionError { message: text_at(1)? },
		EventKind::IdentityDigest => Event::IdentityDigest { digests: text_at(1)? },
		EventKind::QuestionPosed => Event::QuestionPosed { question: text_at(1)? },
		EventKind::CounterpartTyping => Event::CounterpartTyping { counterpart: text_at(1)? },
		EventKind::CounterpartStoppedTyping => Event::CounterpartStoppedTyping { counterpart: text_at(1)? },
		EventKind::CounterpartDisconnected => Event::CounterpartDisconnected { counterpart: text_at(1)? },
		EventKind::ServerBroadcast => Event::ServerBroadcast { message: text_at(1)? },
		EventKind::CaptchaRequired => Event::CaptchaRequired { challenge: text_at(1)? },
		EventKind::CaptchaRejected => Event::CaptchaRejected { challenge: text_at(1)? },
		EventKind::PeerInstitutionName => Event::PeerInstitutionName { institution: text_at(1)? },
		EventKind::CounterpartMessage => Event::CounterpartMessage {
			counterpart: text_at(1)?,
			text: text_at(2)?,
		},
		EventKind::SharedTopics => Event::SharedTopics {
			topics: fields[1..].iter().flat_map(topic_texts).collect(),
		},
		EventKind::MessageReceived => return decode_messages(fields.get(1).ok_or(SkipReason::MissingField { kind, index: 1 })?),
		EventKind::StatusSnapshot => {
			let record = fields
				.get(1)
				.and_then(Value::as_object)
				.ok_or(SkipReason::MissingField { kind, index: 1 })?;
			Event::StatusSnapshot {
				status: StatusRecord::from_object(record).map_err(SkipReason::InvalidStatus)?,
			}
		}
	};

	Ok(vec![event])
}

/// Trims surrounding quotes from a `/start` body and checks that what is
/// left looks like a bare identifier.
pub fn decode_identifier(body: &str) -> Result<String> {
	let id = body.trim().trim_matches('"');
	let bare = !id.is_empty() && !id.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '{' | '}' | '[' | ']' | ','));
	if !bare {
		return Err(DecodeError::BadIdentifier { body: body.to_string() });
	}
	Ok(id.to_string())
}

// `gotMessage` carries either a single string or an array of strings; an
// array fans out into one event per message.
fn decode_messages(payload: &Value) -> std::result::Result<Vec<Event>, SkipReason> {
	let raw: Vec<&str> = match payload {
		Value::String(text) => vec![text.as_str()],
		Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
		_ => {
			return Err(SkipReason::MissingField {
				kind: EventKind::MessageReceived,
				index: 1,
			});
		}
	};

	Ok(raw
		.into_iter()
		.filter_map(|text| match unescape_message(text) {
			Some(text) => Some(Event::MessageReceived { text }),
			None => {
				debug!(target = "om.decode", "dropping message that failed unescaping");
				None
			}
		})
		.collect())
}

/// Undoes the service's double escaping of message text.
///
/// `\/` becomes `/`; any remaining backslash escapes are decoded as a JSON
/// string literal. Returns `None` when the escapes are invalid.
pub fn unescape_message(raw: &str) -> Option<String> {
	if !raw.contains('\\') {
		return Some(raw.to_string());
	}
	let unslashed = raw.replace("\\/", "/");
	if !unslashed.contains('\\') {
		return Some(unslashed);
	}

	let mut literal = String::with_capacity(unslashed.len() + 2);
	literal.push('"');
	let mut escaped = false;
	for ch in unslashed.chars() {
		if !escaped && ch == '"' {
			literal.push('\\');
		}
		if ch.is_control() && (ch as u32) < 0x20 {
			literal.push_str(&format!("\\u{:04x}", ch as u32));
		} else {
			literal.push(ch);
		}
		escaped = ch == '\\' && !escaped;
	}
	if escaped {
		return None;
	}
	literal.push('"');

	serde_json::from_str(&literal).ok()
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

fn topic_texts(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
		other => scalar_text(other).into_iter().collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const STATUS: &str =
		r#"{"count":5,"force_unmon":false,"antinudeservers":["a"],"antinudepercent":0.1,"spyeeQueueTime":1.0,"spyQueueTime":2.0,"timestamp":3.0,"servers":["s1"]}"#;

	#[test]
	fn trivial_bodies_decode_to_nothing() {
		assert!(decode_events("[]").unwrap().is_empty());
		assert!(decode_events("null").unwrap().is_empty());
		assert!(decode_events(" [ ] \n").unwrap().is_empty());
	}

	#[test]
	fn connected_has_no_payload() {
		let events = decode_events(r#"[["connected"]]"#).unwrap();
		assert_eq!(events, vec![Event::Connected]);
		assert!(events[0].fields().is_empty());
	}

	#[test]
	fn nested_messages_fan_out_in_order() {
		let events = decode_events(r#"[["gotMessage", ["hi", "there"]]]"#).unwrap();
		assert_eq!(
			events,
			vec![Event::MessageReceived { text: "hi".into() }, Event::MessageReceived { text: "there".into() }]
		);
	}

	#[test]
	fn plain_string_message_is_accepted() {
		let events = decode_events(r#"[["typing"], ["gotMessage", "hello"]]"#).unwrap();
		assert_eq!(events, vec![Event::PeerTyping, Event::MessageReceived { text: "hello".into() }]);
	}

	#[test]
	fn counterpart_message_carries_sender_and_text() {
		let events = decode_events(r#"[["spyMessage","Alice","hello"]]"#).unwrap();
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].kind(), EventKind::CounterpartMessage);
		assert_eq!(events[0].fields(), vec!["Alice", "hello"]);
	}

	#[test]
	fn unknown_discriminant_alone_is_unknown_shape() {
		let err = decode_events(r#"[["bogusKind","x"]]"#).unwrap_err();
		match err {
			DecodeError::UnknownShape { body } => assert_eq!(body, r#"[["bogusKind","x"]]"#),
			other => panic!("expected UnknownShape, got {other:?}"),
		}
	}

	#[test]
	fn malformed_tuples_are_dropped_when_something_decodes() {
		let body = r#"[42, [], [7, "x"], ["bogusKind"], ["error"], ["spyMessage", "Alice"], ["waiting"]]"#;
		assert_eq!(decode_events(body).unwrap(), vec![Event::WaitingForMatch]);
	}

	#[test]
	fn non_array_root_is_malformed() {
		assert!(matches!(decode_events(r#"{"events": []}"#), Err(DecodeError::MalformedRoot { .. })));
		assert!(matches!(decode_events("\"win\""), Err(DecodeError::MalformedRoot { .. })));
		assert!(matches!(decode_events("<html>"), Err(DecodeError::Json { .. })));
	}

	#[test]
	fn status_snapshot_carries_record() {
		let body = format!(r#"[["statusInfo", {}]]"#, STATUS);
		let events = decode_events(&body).unwrap();
		assert_eq!(events.len(), 1);
		let status = events[0].status().expect("status payload");
		assert_eq!(status.count, 5);
		assert_eq!(status.servers, vec!["s1"]);
		assert!(events[0].fields().is_empty());
	}

	#[test]
	fn incomplete_status_snapshot_is_skipped() {
		let without_servers = STATUS.replace(r#","servers":["s1"]"#, "");
		let body = format!(r#"[["statusInfo", {without_servers}], ["connected"]]"#);
		assert_eq!(decode_events(&body).unwrap(), vec![Event::Connected]);

		let only = format!(r#"[["statusInfo", {without_servers}]]"#);
		assert!(matches!(decode_events(&only), Err(DecodeError::UnknownShape { .. })));
	}

	#[test]
	fn numbers_are_rendered_as_decimal_text() {
		let events = decode_events(r#"[["serverMessage", 42], ["error", 1.5]]"#).unwrap();
		assert_eq!(
			events,
			vec![Event::ServerBroadcast { message: "42".into() }, Event::ConnectionError { message: "1.5".into() }]
		);
	}

	#[test]
	fn single_payload_kinds_need_their_field() {
		for tag in ["error", "identDigests", "question", "spyTyping", "recaptchaRequired", "partnerCollege"] {
			let body = format!(r#"[["{tag}"]]"#);
			assert!(decode_events(&body).is_err(), "{tag} without payload should not decode");
		}
	}

	#[test]
	fn shared_topics_keep_order_and_allow_empty() {
		let events = decode_events(r#"[["commonLikes", "pizza", "go"], ["commonLikes", ["rust", 7]], ["commonLikes"]]"#).unwrap();
		assert_eq!(
			events,
			vec![
				Event::SharedTopics {
					topics: vec!["pizza".into(), "go".into()]
				},
				Event::SharedTopics {
					topics: vec!["rust".into(), "7".into()]
				},
				Event::SharedTopics { topics: vec![] },
			]
		);
	}

	#[test]
	fn escaped_slashes_are_unescaped_and_bad_escapes_dropped() {
		let events = decode_events(r#"[["gotMessage", ["a\\/b", "bad\\q", "ok"]]]"#).unwrap();
		assert_eq!(
			events,
			vec![Event::MessageReceived { text: "a/b".into() }, Event::MessageReceived { text: "ok".into() }]
		);
	}

	#[test]
	fn unescape_handles_quotes_and_sequences() {
		assert_eq!(unescape_message("plain \"quoted\"").as_deref(), Some("plain \"quoted\""));
		assert_eq!(unescape_message(r"line\nbreak").as_deref(), Some("line\nbreak"));
		assert_eq!(unescape_message(r#"say \"hi\" "now""#).as_deref(), Some(r#"say "hi" "now""#));
		assert_eq!(unescape_message(r"trailing\"), None);
	}

	#[test]
	fn no_payload_kinds_ignore_extra_fields() {
		let events = decode_events(r#"[["count", 1234], ["antinudeBanned"], ["connectionDied"]]"#).unwrap();
		assert_eq!(events, vec![Event::OnlineCountUpdate, Event::BannedForAbuse, Event::ConnectionDied]);
		assert!(events[0].fields().is_empty());
	}

	#[test]
	fn identifier_quotes_are_trimmed() {
		assert_eq!(decode_identifier("\"central2:abcdef\"").unwrap(), "central2:abcdef");
		assert_eq!(decode_identifier("shard:xyz\n").unwrap(), "shard:xyz");
	}

	#[test]
	fn identifier_must_be_bare() {
		for body in ["", "\"\"", "{\"clientID\":\"x\"}", "two words", "[\"x\"]"] {
			assert!(
				matches!(decode_identifier(body), Err(DecodeError::BadIdentifier { .. })),
				"{body:?} should be rejected"
			);
		}
	}
}
