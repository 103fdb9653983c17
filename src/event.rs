//! Storage notification model and call key extraction.
//!
//! Object keys arrive URL-encoded with `+` standing for a space. After decoding, the last
//! path segment is the filename and the text before its first `_` is the call key:
//! `uploads/2024/CONTACT123_recording.mp3` yields `CONTACT123`. Keys that do not follow
//! this shape, or that carry a broken escape, are rejected instead of producing a partial
//! or corrupted identifier.

// crates.io
use percent_encoding::percent_decode_str;
// self
use crate::{
	_prelude::*,
	obs::{self, Stage, StageSpan},
};

/// Failures raised while decoding a notification or reading its object key.
#[derive(Debug, ThisError)]
pub enum EventError {
	/// Payload is not JSON at all.
	#[error("Notification payload is not valid JSON.")]
	InvalidJson(#[from] serde_json::Error),
	/// Payload is JSON but does not look like a storage notification.
	#[error("Notification payload has an unexpected shape at `{}`.", .source.path())]
	Shape {
		/// Failure annotated with the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Notification carries no records.
	#[error("Notification contains no records.")]
	NoRecords,
	/// Key has a `%` not followed by two hex digits, or escapes that are not UTF-8.
	#[error("Object key `{key}` is not valid percent-encoded UTF-8.")]
	InvalidEncoding {
		/// Raw object key.
		key: String,
	},
	/// Filename has no `_` separating the call key from the rest.
	#[error("Object filename `{filename}` has no `_` separator.")]
	MissingSeparator {
		/// Decoded filename.
		filename: String,
	},
	/// Filename starts with `_`, leaving an empty call key.
	#[error("Object key `{key}` yields an empty call key.")]
	EmptyIdentifier {
		/// Decoded object key.
		key: String,
	},
}

/// Storage-bucket notification delivered by the trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
	/// Notification records; only the first one is used.
	#[serde(rename = "Records", default)]
	pub records: Vec<NotificationRecord>,
}
impl NotificationEvent {
	/// Decodes a raw JSON payload.
	pub fn from_json(payload: &str) -> Result<Self, EventError> {
		Self::from_value(serde_json::from_str(payload)?)
	}

	/// Decodes an already parsed JSON payload.
	pub fn from_value(payload: Value) -> Result<Self, EventError> {
		serde_path_to_error::deserialize(payload).map_err(|source| EventError::Shape { source })
	}

	/// Builds a single-record notification for `key`.
	pub fn for_key(key: impl Into<String>) -> Self {
		Self {
			records: vec![NotificationRecord {
				event_name: None,
				event_time: None,
				s3: S3Entity {
					bucket: None,
					object: S3Object { key: key.into(), size: None, e_tag: None },
				},
			}],
		}
	}

	/// Raw (still encoded) key of the first record.
	pub fn first_key(&self) -> Option<&str> {
		self.records.first().map(|record| record.s3.object.key.as_str())
	}
}

/// One notification record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
	/// Event name such as `ObjectCreated:Put`.
	#[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
	pub event_name: Option<String>,
	/// Event timestamp.
	#[serde(
		rename = "eventTime",
		default,
		skip_serializing_if = "Option::is_none",
		with = "time::serde::rfc3339::option"
	)]
	pub event_time: Option<OffsetDateTime>,
	/// Storage section of the record.
	pub s3: S3Entity,
}

/// Storage section of a notification record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
	/// Bucket holding the object.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bucket: Option<S3Bucket>,
	/// Created object.
	pub object: S3Object,
}

/// Bucket reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Bucket {
	/// Bucket name.
	pub name: String,
}

/// Created object reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Object {
	/// URL-encoded object key.
	pub key: String,
	/// Object size in bytes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<u64>,
	/// Object entity tag.
	#[serde(rename = "eTag", default, skip_serializing_if = "Option::is_none")]
	pub e_tag: Option<String>,
}

/// Non-empty call key read from an object's filename.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BusinessId(String);
impl BusinessId {
	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for BusinessId {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl Display for BusinessId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Extracts the call key from the first record of `event`.
pub fn extract_business_id(event: &NotificationEvent) -> Result<BusinessId, EventError> {
	let _span = StageSpan::new(Stage::ParseEvent).entered();
	let result = event.first_key().ok_or(EventError::NoRecords).and_then(business_id_from_key);

	obs::record_result(Stage::ParseEvent, &result);

	#[cfg(feature = "tracing")]
	{
		if let Ok(id) = &result {
			tracing::info!(business_id = %id, "extracted call key");
		}
	}

	result
}

/// Extracts the call key from one raw object key.
pub fn business_id_from_key(raw_key: &str) -> Result<BusinessId, EventError> {
	let key = decode_object_key(raw_key)?;
	let filename = key.rsplit('/').next().unwrap_or_default();
	let (id, _) = filename
		.split_once('_')
		.ok_or_else(|| EventError::MissingSeparator { filename: filename.to_owned() })?;

	if id.is_empty() {
		return Err(EventError::EmptyIdentifier { key });
	}

	Ok(BusinessId(id.to_owned()))
}

/// Decodes a notification object key: `+` becomes a space, then `%XX` escapes are resolved.
///
/// A `%2B` escape therefore decodes to a literal `+`. A `%` without two hex digits after it,
/// or escapes that decode to invalid UTF-8, fail with [`EventError::InvalidEncoding`].
pub fn decode_object_key(raw_key: &str) -> Result<String, EventError> {
	let invalid = || EventError::InvalidEncoding { key: raw_key.to_owned() };
	let spaced = raw_key.replace('+', " ");

	if has_broken_escape(spaced.as_bytes()) {
		return Err(invalid());
	}

	percent_decode_str(&spaced)
		.decode_utf8()
		.map(|decoded| decoded.into_owned())
		.map_err(|_| invalid())
}

fn has_broken_escape(bytes: &[u8]) -> bool {
	bytes.iter().enumerate().any(|(i, byte)| {
		*byte == b'%'
			&& !matches!(
				bytes.get(i + 1..i + 3),
				Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
			)
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn call_key_is_first_filename_segment() {
		for (key, expected) in [
			("uploads/2024/CONTACT123_recording.mp3", "CONTACT123"),
			("CONTACT9_a_b_c.wav", "CONTACT9"),
			("a/b/c/d/e/ID_rest", "ID"),
			("folder_with_underscore/X1_y.mp3", "X1"),
		] {
			let id = business_id_from_key(key).expect("Well-formed keys should yield a call key.");

			assert_eq!(id.as_str(), expected, "key: {key}");
		}
	}

	fn decoded(raw_key: &str) -> String {
		decode_object_key(raw_key).expect("Test key should decode.")
	}

	#[test]
	fn key_is_form_decoded_before_splitting() {
		assert_eq!(decoded("my+folder/A%2FB_c%2Bd.mp3"), "my folder/A/B_c+d.mp3");
		assert_eq!(decoded("x%26y%3Dz/ID_1"), "x&y=z/ID_1");
		assert_eq!(decoded("raw&key=1/ID_1"), "raw&key=1/ID_1");
		assert_eq!(decoded("caf%C3%A9/ID_1"), "café/ID_1");
		assert_eq!(decoded(""), "");

		// An encoded slash becomes a path separator after decoding.
		let id = business_id_from_key("uploads/A%2FCALL7_x.mp3")
			.expect("Encoded keys should yield a call key.");

		assert_eq!(id.as_str(), "CALL7");

		let id = business_id_from_key("uploads/CALL+8_x.mp3")
			.expect("Plus-encoded keys should yield a call key.");

		assert_eq!(id.as_str(), "CALL 8");
	}

	#[test]
	fn malformed_keys_fail_fast() {
		assert!(matches!(
			business_id_from_key("uploads/recording.mp3"),
			Err(EventError::MissingSeparator { filename }) if filename == "recording.mp3"
		));
		assert!(matches!(
			business_id_from_key("uploads/2024/"),
			Err(EventError::MissingSeparator { filename }) if filename.is_empty()
		));
		assert!(matches!(
			business_id_from_key("uploads/_recording.mp3"),
			Err(EventError::EmptyIdentifier { .. })
		));
	}

	#[test]
	fn broken_escapes_are_rejected() {
		for key in [
			"uploads/CA%ZZLL_x.mp3",
			"uploads/CALL%E9_x.mp3",
			"uploads/CALL_x.mp3%",
			"uploads/CALL%4_x.mp3",
		] {
			assert!(
				matches!(
					business_id_from_key(key),
					Err(EventError::InvalidEncoding { key: reported }) if reported == key
				),
				"key: {key}"
			);
		}
	}

	#[test]
	fn empty_notification_has_no_records() {
		let event =
			NotificationEvent::from_json("{}").expect("An object without records should decode.");

		assert!(matches!(extract_business_id(&event), Err(EventError::NoRecords)));
	}

	#[test]
	fn decodes_storage_notification_payload() {
		let payload = r#"{
			"Records": [{
				"eventVersion": "2.1",
				"eventSource": "aws:s3",
				"eventName": "ObjectCreated:Put",
				"eventTime": "2024-05-01T12:30:00.000Z",
				"s3": {
					"bucket": { "name": "call-recordings", "arn": "arn:aws:s3:::call-recordings" },
					"object": { "key": "uploads/2024/CONTACT123_recording.mp3", "size": 1024, "eTag": "abc" }
				}
			}]
		}"#;
		let event = NotificationEvent::from_json(payload).expect("Payload should decode.");
		let record = event.records.first().expect("Payload should carry one record.");

		assert_eq!(record.event_name.as_deref(), Some("ObjectCreated:Put"));
		assert!(record.event_time.is_some());
		assert_eq!(
			record.s3.bucket.as_ref().map(|bucket| bucket.name.as_str()),
			Some("call-recordings")
		);
		assert_eq!(record.s3.object.size, Some(1024));
		assert_eq!(
			extract_business_id(&event).expect("Payload key should yield a call key.").as_str(),
			"CONTACT123"
		);
	}

	#[test]
	fn shape_errors_report_the_json_path() {
		let err = NotificationEvent::from_json(r#"{"Records":[{"s3":{"object":{}}}]}"#)
			.expect_err("A record without a key should be rejected.");

		match err {
			EventError::Shape { source } => {
				assert_eq!(source.path().to_string(), "Records[0].s3.object");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert!(matches!(
			NotificationEvent::from_json("not json"),
			Err(EventError::InvalidJson(_))
		));
	}

	#[test]
	fn for_key_builds_single_record_event() {
		let event = NotificationEvent::for_key("in/K1_x");

		assert_eq!(event.first_key(), Some("in/K1_x"));
		assert_eq!(extract_business_id(&event).expect("Key should yield an id.").as_str(), "K1");
	}
}
