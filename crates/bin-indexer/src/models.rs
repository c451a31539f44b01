//! Record shapes flowing through the pipeline

use num_bigint::BigUint;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Field carrying the inclusive lower account-number bound of a range
pub const LOW_ACCOUNT_RANGE: &str = "LowAccountRange";

/// Field carrying the inclusive upper account-number bound of a range
pub const HIGH_ACCOUNT_RANGE: &str = "HighAccountRange";

/// Raw field values extracted from one physical line, keyed by field name
pub type RawRecord = BTreeMap<String, String>;

/// A semantic field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    /// Non-negative integer of arbitrary width (account ranges exceed u64)
    Integer(BigUint),
    /// Nested object such as `Issuer` or `{Code, Alpha3, Name}`
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Only empty text and empty objects count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Object(fields) => fields.is_empty(),
            FieldValue::Flag(_) | FieldValue::Integer(_) => false,
        }
    }

    /// Build an object value from `(key, value)` pairs
    pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        FieldValue::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<BigUint> for FieldValue {
    fn from(value: BigUint) -> Self {
        FieldValue::Integer(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Flag(b) => serializer.serialize_bool(*b),
            // JSON consumers lose precision past 64 bits, so wider values go out as strings
            FieldValue::Integer(n) => match u64::try_from(n) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.serialize_str(&n.to_string()),
            },
            FieldValue::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            },
        }
    }
}

/// The normalized detail record persisted per BIN range
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct SemanticRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl SemanticRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text value of a field, or `""` when absent or not text
    pub fn text(&self, field: &str) -> &str {
        self.get(field).and_then(FieldValue::as_text).unwrap_or("")
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    /// Next snapshot with `field` set to `value`
    pub fn with_field(mut self, field: &str, value: FieldValue) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<RawRecord> for SemanticRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            fields: raw
                .into_iter()
                .map(|(name, value)| (name, FieldValue::Text(value)))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SemanticRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_serializes_as_number_within_u64() {
        let record: SemanticRecord =
            [(LOW_ACCOUNT_RANGE, FieldValue::Integer(BigUint::from(400002000000000000u64)))]
                .into_iter()
                .collect();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({ "LowAccountRange": 400002000000000000u64 }));
    }

    #[test]
    fn test_wide_integer_serializes_as_string() {
        let wide: BigUint = "12345678901234567890123".parse().unwrap();
        let json = serde_json::to_string(&FieldValue::Integer(wide)).unwrap();
        assert_eq!(json, "\"12345678901234567890123\"");
    }

    #[test]
    fn test_nested_object_serialization() {
        let mut record = SemanticRecord::new();
        record.insert("CheckDigit", true);
        record.insert(
            "Country",
            FieldValue::object([("Code", "840"), ("Alpha3", "USA"), ("Name", "United States")]),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "CheckDigit": true,
                "Country": { "Alpha3": "USA", "Code": "840", "Name": "United States" }
            })
        );
    }

    #[test]
    fn test_emptiness() {
        assert!(FieldValue::text("").is_empty());
        assert!(!FieldValue::Flag(false).is_empty());
        assert!(!FieldValue::text("NATIONAL").is_empty());
    }
}
