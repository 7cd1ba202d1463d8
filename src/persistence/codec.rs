//! Snapshot format
//!
//! Layout: `{ "<key>": { "value": <json>, "expires": "<rfc3339>" }, ... }`
//! with `expires` omitted when a record has none.

use super::SnapshotError;
use crate::store::StoreMap;

/// Serialize the whole store to snapshot bytes
pub fn encode(records: &StoreMap) -> Result<Vec<u8>, SnapshotError> {
    serde_json::to_vec_pretty(records).map_err(SnapshotError::Encode)
}

/// Parse snapshot bytes back into a store map
///
/// Keys are taken from the enclosing object and copied into each record.
pub fn decode(bytes: &[u8]) -> Result<StoreMap, SnapshotError> {
    let mut records: StoreMap = serde_json::from_slice(bytes).map_err(SnapshotError::Decode)?;
    for (key, record) in records.iter_mut() {
        record.key.clone_from(key);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{empty_map, Record};
    use chrono::DateTime;

    fn sample() -> StoreMap {
        let mut map = empty_map(4);
        map.insert("plain".into(), Record::from_json("plain", r#"{"x":1}"#).unwrap());

        let mut dated = Record::from_json("dated", r#"[1, "two", {"three": null}]"#).unwrap();
        dated.expires = Some(DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z").unwrap());
        map.insert("dated".into(), dated);

        let mut shifted = Record::from_json("shifted", "\"text\"").unwrap();
        shifted.expires = Some(DateTime::parse_from_rfc3339("2029-12-31T23:59:59.250-05:00").unwrap());
        map.insert("shifted".into(), shifted);
        map
    }

    #[test]
    fn test_round_trip() {
        let original = sample();
        let bytes = encode(&original).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_round_trip_empty() {
        let bytes = encode(&empty_map(0)).unwrap();
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_layout() {
        let mut map = empty_map(1);
        map.insert("a".into(), Record::from_json("a", r#"{"x":1}"#).unwrap());
        let bytes = encode(&map).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, serde_json::json!({ "a": { "value": { "x": 1 } } }));
    }

    #[test]
    fn test_decode_fills_keys() {
        let bytes = br#"{"k1": {"value": 5}, "k2": {"value": "s", "expires": "2030-01-01T00:00:00Z"}}"#;
        let decoded = decode(bytes).unwrap();
        assert_eq!(decoded["k1"].key, "k1");
        assert_eq!(decoded["k2"].key, "k2");
        assert!(decoded["k2"].expires.is_some());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let cases: [&[u8]; 7] = [
            b"not json",
            b"",
            b"[1, 2, 3]",
            br#"{"a": 1}"#,
            br#"{"a": {"expires": "2030-01-01T00:00:00Z"}}"#,
            br#"{"a": {"value": 1, "expires": "not a date"}}"#,
            br#"{"a": {"value": 1}"#,
        ];
        for bad in cases {
            let err = decode(bad).unwrap_err();
            assert!(matches!(err, SnapshotError::Decode(_)), "accepted {:?}", bad);
        }
    }
}
