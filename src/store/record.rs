//! Record structure for stored values

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// A single stored value
///
/// The value is kept as the raw JSON text it arrived as, so it is written back
/// byte for byte. `expires` is carried and persisted but never consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// The key (lives in the surrounding map on the wire)
    #[serde(skip)]
    pub key: String,

    /// The opaque JSON document
    pub value: Box<RawValue>,

    /// Optional expiration timestamp supplied by the writer
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rfc3339_opt")]
    pub expires: Option<DateTime<FixedOffset>>,
}

impl Record {
    /// Create a new record without expiration
    pub fn new(key: impl Into<String>, value: Box<RawValue>) -> Self {
        Record {
            key: key.into(),
            value,
            expires: None,
        }
    }

    /// Create a new record with an expiration timestamp
    pub fn with_expiration(
        key: impl Into<String>,
        value: Box<RawValue>,
        expires: DateTime<FixedOffset>,
    ) -> Self {
        Record {
            key: key.into(),
            value,
            expires: Some(expires),
        }
    }

    /// Build a record from JSON text, rejecting anything that is not a JSON document
    pub fn from_json(key: impl Into<String>, json: &str) -> Result<Self, serde_json::Error> {
        let value = serde_json::from_str::<Box<RawValue>>(json)?;
        Ok(Record::new(key, value))
    }

    /// The value as JSON text
    pub fn value_json(&self) -> &str {
        self.value.get()
    }

    pub fn has_expiration(&self) -> bool {
        self.expires.is_some()
    }

    /// Approximate memory usage of this record in bytes
    pub fn memory_usage(&self) -> usize {
        self.key.len()
            + self.value.get().len()
            + std::mem::size_of::<Option<DateTime<FixedOffset>>>()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value.get() == other.value.get()
            && self.expires == other.expires
            && self.expires.map(|e| *e.offset()) == other.expires.map(|e| *e.offset())
    }
}

impl Eq for Record {}

/// RFC 3339 text form for the optional `expires` field
mod rfc3339_opt {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<FixedOffset>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => DateTime::parse_from_rfc3339(&text)
                .map(Some)
                .map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
