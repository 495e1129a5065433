//! Deterministic entry serialization for the QR/URL transport.
//!
//! Each entry becomes one JSON array: a schema tag followed by the field
//! values in lexicographic field-name order, timestamps as RFC 3339. The
//! layout is fixed so two engine versions agree without schema
//! negotiation. Decoding is a structured, position-checked parse; the
//! payload is never executed or eval'd.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::entry::{BusyStatus, CalendarEntry};
use crate::error::{CalBridgeError, CalBridgeResult};

/// Schema tag, first element of every encoded entry.
pub const SCHEMA_TAG: &str = "cb1";

/// Separator between entries in a multi-entry payload. JSON escapes
/// newlines inside strings, so the delimiter cannot occur in an encoded
/// entry.
pub const PAYLOAD_DELIMITER: char = '\n';

/// Number of elements in an encoded entry: tag + 10 fields.
const WIRE_LEN: usize = 11;

/// Encode one entry. Self-verifies by decoding the result and comparing;
/// a mismatch means the codec halves have drifted and the string must not
/// be trusted for transport.
pub fn encode_entry(entry: &CalendarEntry) -> CalBridgeResult<String> {
    entry.validate()?;

    // Lexicographic by field name: attendees, busy_status, categories,
    // category_colors, end, location, organizer, source_key, start, subject.
    let wire = Value::Array(vec![
        Value::from(SCHEMA_TAG),
        Value::from(entry.attendees.clone()),
        Value::from(entry.busy_status.as_str()),
        Value::from(entry.categories.clone()),
        Value::from(entry.category_colors.clone()),
        Value::from(entry.end.to_rfc3339()),
        Value::from(entry.location.clone()),
        Value::from(entry.organizer.clone()),
        Value::from(entry.source_key.clone()),
        Value::from(entry.start.to_rfc3339()),
        Value::from(entry.subject.clone()),
    ]);

    let encoded = serde_json::to_string(&wire)
        .map_err(|e| CalBridgeError::Decode(format!("failed to encode entry: {e}")))?;

    let verified = decode_entry(&encoded)?;
    if verified != *entry {
        return Err(CalBridgeError::Decode(format!(
            "encode/decode drift for entry '{}'",
            entry.subject
        )));
    }

    Ok(encoded)
}

/// Decode one encoded entry. Malformed input fails with `Decode`; garbage
/// is never coerced into a partially-populated entry.
pub fn decode_entry(encoded: &str) -> CalBridgeResult<CalendarEntry> {
    let wire: Value = serde_json::from_str(encoded)
        .map_err(|e| CalBridgeError::Decode(format!("entry is not valid JSON: {e}")))?;

    let fields = wire
        .as_array()
        .ok_or_else(|| CalBridgeError::Decode("entry is not a JSON array".to_string()))?;

    if fields.len() != WIRE_LEN {
        return Err(CalBridgeError::Decode(format!(
            "entry has {} elements, expected {WIRE_LEN}",
            fields.len()
        )));
    }

    let tag = as_str(&fields[0], "schema tag")?;
    if tag != SCHEMA_TAG {
        return Err(CalBridgeError::Decode(format!(
            "unknown schema tag '{tag}', expected '{SCHEMA_TAG}'"
        )));
    }

    let busy_name = as_str(&fields[2], "busy_status")?;
    let busy_status = BusyStatus::from_name(busy_name)
        .ok_or_else(|| CalBridgeError::Decode(format!("unknown busy status '{busy_name}'")))?;

    let entry = CalendarEntry {
        attendees: as_string_vec(&fields[1], "attendees")?,
        busy_status,
        categories: as_string_vec(&fields[3], "categories")?,
        category_colors: as_string_vec(&fields[4], "category_colors")?,
        end: as_timestamp(&fields[5], "end")?,
        location: as_str(&fields[6], "location")?.to_string(),
        organizer: as_str(&fields[7], "organizer")?.to_string(),
        source_key: as_str(&fields[8], "source_key")?.to_string(),
        start: as_timestamp(&fields[9], "start")?,
        subject: as_str(&fields[10], "subject")?.to_string(),
    };

    entry
        .validate()
        .map_err(|e| CalBridgeError::Decode(format!("decoded entry is not legal: {e}")))?;

    Ok(entry)
}

/// Encode a batch of entries into one transport payload, optionally
/// prefixed by a shared token line. The token authorizes acceptance at the
/// receiving side by plain equality; it is a known-constant tag, not a
/// security boundary.
pub fn encode_payload(entries: &[CalendarEntry], token: Option<&str>) -> CalBridgeResult<String> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    if let Some(token) = token {
        lines.push(token.to_string());
    }
    for entry in entries {
        lines.push(encode_entry(entry)?);
    }
    Ok(lines.join(&PAYLOAD_DELIMITER.to_string()))
}

/// Decode a transport payload. When `expected_token` is set, the first
/// line must match it exactly or the whole payload is rejected.
pub fn decode_payload(
    payload: &str,
    expected_token: Option<&str>,
) -> CalBridgeResult<Vec<CalendarEntry>> {
    let mut lines = payload.split(PAYLOAD_DELIMITER);

    if let Some(expected) = expected_token {
        let first = lines
            .next()
            .ok_or_else(|| CalBridgeError::Decode("payload is empty".to_string()))?;
        if first != expected {
            return Err(CalBridgeError::Decode(
                "payload token mismatch".to_string(),
            ));
        }
    }

    lines
        .filter(|line| !line.is_empty())
        .map(decode_entry)
        .collect()
}

fn as_str<'a>(value: &'a Value, field: &str) -> CalBridgeResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| CalBridgeError::Decode(format!("field '{field}' is not a string")))
}

fn as_string_vec(value: &Value, field: &str) -> CalBridgeResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| CalBridgeError::Decode(format!("field '{field}' is not an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                CalBridgeError::Decode(format!("field '{field}' contains a non-string element"))
            })
        })
        .collect()
}

fn as_timestamp(value: &Value, field: &str) -> CalBridgeResult<DateTime<FixedOffset>> {
    let raw = as_str(value, field)?;
    DateTime::parse_from_rfc3339(raw).map_err(|e| {
        CalBridgeError::Decode(format!("field '{field}' is not an RFC 3339 timestamp: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn entry() -> CalendarEntry {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        CalendarEntry {
            subject: "Quarterly review".to_string(),
            start: tz.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap(),
            end: tz.with_ymd_and_hms(2024, 4, 2, 11, 30, 0).unwrap(),
            location: "Room 4".to_string(),
            organizer: "Dana".to_string(),
            busy_status: BusyStatus::Tentative,
            attendees: vec!["dana@example.com".to_string(), "lee@example.com".to_string()],
            categories: vec!["Planning".to_string(), "Internal".to_string()],
            category_colors: vec!["#3366cc".to_string(), "#cc3366".to_string()],
            source_key: "conv-42".to_string(),
        }
    }

    #[test]
    fn test_roundtrip_full_entry() {
        let original = entry();
        let encoded = encode_entry(&original).unwrap();
        let decoded = decode_entry(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let e = entry();
        assert_eq!(encode_entry(&e).unwrap(), encode_entry(&e).unwrap());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(
            decode_entry("not json at all"),
            Err(CalBridgeError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_tag() {
        let encoded = encode_entry(&entry()).unwrap();
        let tampered = encoded.replacen(SCHEMA_TAG, "zz9", 1);
        assert!(matches!(
            decode_entry(&tampered),
            Err(CalBridgeError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_array() {
        assert!(matches!(
            decode_entry(r#"["cb1",[],"Free"]"#),
            Err(CalBridgeError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let encoded = encode_entry(&entry()).unwrap();
        let tampered = encoded.replace("2024-04-02T10:00:00+03:00", "yesterday-ish");
        assert!(matches!(
            decode_entry(&tampered),
            Err(CalBridgeError::Decode(_))
        ));
    }

    #[test]
    fn test_payload_roundtrip_with_token() {
        let entries = vec![entry(), {
            let mut second = entry();
            second.source_key = "conv-43".to_string();
            second.subject = "Follow-up".to_string();
            second
        }];
        let payload = encode_payload(&entries, Some("team-tag-7")).unwrap();
        let decoded = decode_payload(&payload, Some("team-tag-7")).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_payload_rejects_wrong_token() {
        let payload = encode_payload(&[entry()], Some("team-tag-7")).unwrap();
        assert!(matches!(
            decode_payload(&payload, Some("other-tag")),
            Err(CalBridgeError::Decode(_))
        ));
    }

    #[test]
    fn test_payload_without_token_roundtrips() {
        let entries = vec![entry()];
        let payload = encode_payload(&entries, None).unwrap();
        assert_eq!(decode_payload(&payload, None).unwrap(), entries);
    }

    #[test]
    fn test_empty_payload_decodes_to_no_entries() {
        assert!(decode_payload("", None).unwrap().is_empty());
    }

    #[test]
    fn test_newlines_in_subject_stay_inside_one_line() {
        let mut e = entry();
        e.subject = "line one\nline two".to_string();
        let payload = encode_payload(&[e.clone()], None).unwrap();
        let decoded = decode_payload(&payload, None).unwrap();
        assert_eq!(decoded, vec![e]);
    }
}
