//! Rows of a rendered chat log.

use serde_json::Value;

/// One line of a chat log sent to the log renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
	/// Small grey text.
	Notice(String),
	/// Blue question box.
	Question(String),
	/// Stranger line, red label.
	Stranger(String),
	/// First stranger in a spy session.
	Stranger1(String),
	/// Second stranger in a spy session, blue label.
	Stranger2(String),
	/// Local user line, blue label.
	You(String),
	/// Arbitrary bold label followed by text.
	Line { label: String, text: String },
}

impl LogEntry {
	/// The JSON row the renderer expects for this entry.
	pub fn row(&self) -> Vec<&str> {
		match self {
			Self::Notice(text) => vec![text.as_str()],
			Self::Question(text) => vec!["Question to discuss:", text.as_str()],
			Self::Stranger(text) => vec!["Stranger:", text.as_str()],
			Self::Stranger1(text) => vec!["Stranger 1:", text.as_str()],
			Self::Stranger2(text) => vec!["Stranger 2:", text.as_str()],
			Self::You(text) => vec!["You:", text.as_str()],
			Self::Line { label, text } => vec![label.as_str(), text.as_str()],
		}
	}
}

/// Encodes entries as the `log` form parameter.
pub fn encode_log(entries: &[LogEntry]) -> String {
	let rows: Vec<Value> = entries.iter().map(|entry| Value::from(entry.row())).collect();
	Value::Array(rows).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rows_carry_their_labels() {
		let entries = vec![
			LogEntry::Notice("om".into()),
			LogEntry::Question("cats or dogs?".into()),
			LogEntry::Stranger("hi".into()),
			LogEntry::You("hello".into()),
			LogEntry::Line {
				label: "Mod:".into(),
				text: "be nice".into(),
			},
		];

		assert_eq!(
			encode_log(&entries),
			r#"[["om"],["Question to discuss:","cats or dogs?"],["Stranger:","hi"],["You:","hello"],["Mod:","be nice"]]"#
		);
	}

	#[test]
	fn spy_rows_are_numbered() {
		assert_eq!(LogEntry::Stranger1("a".into()).row(), vec!["Stranger 1:", "a"]);
		assert_eq!(LogEntry::Stranger2("b".into()).row(), vec!["Stranger 2:", "b"]);
	}

	#[test]
	fn empty_log_is_an_empty_array() {
		assert_eq!(encode_log(&[]), "[]");
	}
}
