//! Service-wide status snapshot.
//!
//! The same object shape is returned by `/status` and embedded in the event
//! stream as the payload of a `statusInfo` tuple:
//!
//! ```json
//! {
//!   "count": 31337,
//!   "force_unmon": false,
//!   "antinudeservers": ["waw1.omegle.com"],
//!   "antinudepercent": 1.0,
//!   "spyeeQueueTime": 0.1,
//!   "spyQueueTime": 0.0,
//!   "timestamp": 1406031154.3,
//!   "servers": ["front1", "front2"]
//! }
//! ```
//!
//! Every field is mandatory. Fields are checked in the order above and the
//! first failure is reported by its wire name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DecodeError, Result};

/// Snapshot of service-wide operational counters.
///
/// Serializes under the wire field names, so `--json` output can be fed
/// back to [`StatusRecord::parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
	/// Users currently online.
	pub count: u64,
	/// True when this client's address is forced into the unmonitored group.
	pub force_unmon: bool,
	/// Content-filter servers.
	#[serde(rename = "antinudeservers")]
	pub antinude_servers: Vec<String>,
	/// Content-filter threshold.
	#[serde(rename = "antinudepercent")]
	pub antinude_percent: f64,
	/// Wait time in the spyee queue.
	#[serde(rename = "spyeeQueueTime")]
	pub spyee_queue_time: f64,
	/// Wait time in the spy queue. Larger than `spyee_queue_time` when spies outnumber spyees.
	#[serde(rename = "spyQueueTime")]
	pub spy_queue_time: f64,
	/// Server-side timestamp of the snapshot.
	pub timestamp: f64,
	/// Front servers a session may be pinned to.
	pub servers: Vec<String>,
}

impl StatusRecord {
	/// Parses a complete `/status` response body.
	///
	/// Field errors carry `body` unchanged.
	pub fn parse(body: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(body).map_err(|source| DecodeError::Json {
			body: body.to_string(),
			source,
		})?;
		match value {
			Value::Object(map) => Self::check(&map).map_err(|field| DecodeError::Status { field, body: body.to_string() }),
			_ => Err(DecodeError::MalformedRoot { body: body.to_string() }),
		}
	}

	/// Builds a record from an already-parsed JSON object.
	///
	/// Field errors carry the object re-serialized.
	pub fn from_object(map: &Map<String, Value>) -> Result<Self> {
		Self::check(map).map_err(|field| DecodeError::Status {
			field,
			body: Value::Object(map.clone()).to_string(),
		})
	}

	// Err is the wire name of the first failing field.
	fn check(map: &Map<String, Value>) -> std::result::Result<Self, &'static str> {
		Ok(Self {
			count: count(map, "count")?,
			force_unmon: map.get("force_unmon").and_then(Value::as_bool).ok_or("force_unmon")?,
			antinude_servers: string_list(map, "antinudeservers")?,
			antinude_percent: number(map, "antinudepercent")?,
			spyee_queue_time: number(map, "spyeeQueueTime")?,
			spy_queue_time: number(map, "spyQueueTime")?,
			timestamp: number(map, "timestamp")?,
			servers: string_list(map, "servers")?,
		})
	}
}

fn number(map: &Map<String, Value>, field: &'static str) -> std::result::Result<f64, &'static str> {
	map.get(field).and_then(Value::as_f64).ok_or(field)
}

// Whole, non-negative numbers only; `5.0` is accepted, `5.7` and `-3` are not.
fn count(map: &Map<String, Value>, field: &'static str) -> std::result::Result<u64, &'static str> {
	let value = map.get(field).ok_or(field)?;
	if let Some(n) = value.as_u64() {
		return Ok(n);
	}
	match value.as_f64() {
		Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(n as u64),
		_ => Err(field),
	}
}

// Non-string entries are ignored; an empty result counts as missing.
fn string_list(map: &Map<String, Value>, field: &'static str) -> std::result::Result<Vec<String>, &'static str> {
	let items: Vec<String> = map
		.get(field)
		.and_then(Value::as_array)
		.ok_or(field)?
		.iter()
		.filter_map(|item| item.as_str().map(str::to_string))
		.collect();

	if items.is_empty() {
		return Err(field);
	}
	Ok(items)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample() -> Value {
		json!({
			"count": 5,
			"force_unmon": false,
			"antinudeservers": ["a"],
			"antinudepercent": 0.1,
			"spyeeQueueTime": 1.0,
			"spyQueueTime": 2.0,
			"timestamp": 3.0,
			"servers": ["s1"]
		})
	}

	fn parse_value(value: &Value) -> Result<StatusRecord> {
		StatusRecord::parse(&value.to_string())
	}

	#[test]
	fn parses_complete_record() {
		let record = parse_value(&sample()).unwrap();
		assert_eq!(record.count, 5);
		assert!(!record.force_unmon);
		assert_eq!(record.antinude_servers, vec!["a"]);
		assert_eq!(record.antinude_percent, 0.1);
		assert_eq!(record.spyee_queue_time, 1.0);
		assert_eq!(record.spy_queue_time, 2.0);
		assert_eq!(record.timestamp, 3.0);
		assert_eq!(record.servers, vec!["s1"]);
	}

	#[test]
	fn every_field_is_mandatory() {
		for field in [
			"count",
			"force_unmon",
			"antinudeservers",
			"antinudepercent",
			"spyeeQueueTime",
			"spyQueueTime",
			"timestamp",
			"servers",
		] {
			let mut value = sample();
			value.as_object_mut().unwrap().remove(field);
			match parse_value(&value) {
				Err(DecodeError::Status { field: reported, .. }) => assert_eq!(reported, field),
				other => panic!("expected Status error for {field}, got {other:?}"),
			}
		}
	}

	#[test]
	fn reports_first_failing_field_in_schema_order() {
		let mut value = sample();
		let map = value.as_object_mut().unwrap();
		map.insert("servers".into(), json!("not-a-list"));
		map.insert("antinudepercent".into(), json!("high"));

		match parse_value(&value) {
			Err(DecodeError::Status { field, .. }) => assert_eq!(field, "antinudepercent"),
			other => panic!("expected Status error, got {other:?}"),
		}
	}

	#[test]
	fn empty_server_list_is_rejected() {
		let mut value = sample();
		value["servers"] = json!([]);
		assert!(matches!(parse_value(&value), Err(DecodeError::Status { field: "servers", .. })));
	}

	#[test]
	fn non_object_root_is_malformed() {
		assert!(matches!(StatusRecord::parse("[1,2]"), Err(DecodeError::MalformedRoot { .. })));
		assert!(matches!(StatusRecord::parse("nope"), Err(DecodeError::Json { .. })));
	}

	#[test]
	fn field_errors_keep_the_raw_body() {
		let body = r#"{"count":1,"force_unmon":false}"#;
		let err = StatusRecord::parse(body).unwrap_err();
		assert!(matches!(err, DecodeError::Status { field: "antinudeservers", .. }));
		assert_eq!(err.body(), Some(body));

		let mut value = sample();
		value.as_object_mut().unwrap().remove("timestamp");
		let err = StatusRecord::from_object(value.as_object().unwrap()).unwrap_err();
		assert!(err.body().unwrap().contains("\"spyQueueTime\":2.0"));
	}

	#[test]
	fn count_must_be_a_whole_non_negative_number() {
		for bad in [json!(-3.7), json!(5.7), json!(-3), json!("5"), json!(null)] {
			let mut value = sample();
			value["count"] = bad.clone();
			assert!(
				matches!(parse_value(&value), Err(DecodeError::Status { field: "count", .. })),
				"count {bad} should be rejected"
			);
		}

		let mut value = sample();
		value["count"] = json!(31337.0);
		assert_eq!(parse_value(&value).unwrap().count, 31337);
	}

	#[test]
	fn serialized_record_uses_wire_field_names() {
		let record = parse_value(&sample()).unwrap();
		let json = serde_json::to_string(&record).unwrap();

		for name in ["\"force_unmon\"", "\"antinudeservers\"", "\"antinudepercent\"", "\"spyeeQueueTime\"", "\"spyQueueTime\""] {
			assert!(json.contains(name), "{name} missing from {json}");
		}
		assert_eq!(StatusRecord::parse(&json).unwrap(), record);
		assert_eq!(serde_json::from_value::<StatusRecord>(sample()).unwrap(), record);
	}
}
