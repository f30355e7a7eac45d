//! Structured and compact record shapes
//!
//! - `StructuredRecord`: field name -> JSON value, the human-facing form
//! - `CompactRecord`: key code -> scalar | nested record | record sequence
//! - `CompactDocument`: a root `CompactRecord` plus its version header

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::schema::{KeyCode, SchemaVersion};

/// Human-facing record: field names to JSON values.
pub type StructuredRecord = Map<String, Value>;

/// Value stored under a key code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompactValue {
    /// Scalar payload, copied verbatim
    Scalar(Value),
    /// Singleton child record
    Record(CompactRecord),
    /// Ordered sequence of child records
    Records(Vec<CompactRecord>),
}

impl CompactValue {
    /// Lifts a JSON value produced by a container codec.
    ///
    /// Objects whose keys are all key codes become records, non-empty arrays
    /// of such objects become record sequences; everything else stays scalar.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) if !map.is_empty() && map.keys().all(|k| parse_key(k).is_some()) => {
                match CompactRecord::from_json_map(map) {
                    Ok(record) => CompactValue::Record(record),
                    Err(map) => CompactValue::Scalar(Value::Object(map)),
                }
            }
            Value::Array(items)
                if !items.is_empty() && items.iter().all(lifts_to_record) =>
            {
                let records = items
                    .into_iter()
                    .filter_map(|item| match CompactValue::from_json(item) {
                        CompactValue::Record(record) => Some(record),
                        _ => None,
                    })
                    .collect();
                CompactValue::Records(records)
            }
            other => CompactValue::Scalar(other),
        }
    }

    /// Lowers this value back to plain JSON.
    pub fn to_json(&self) -> Value {
        match self {
            CompactValue::Scalar(value) => value.clone(),
            CompactValue::Record(record) => record.to_json(),
            CompactValue::Records(records) => {
                Value::Array(records.iter().map(CompactRecord::to_json).collect())
            }
        }
    }

    /// Views this value as a single record, if it has that shape.
    pub fn as_record(&self) -> Option<CompactRecord> {
        match self {
            CompactValue::Record(record) => Some(record.clone()),
            CompactValue::Scalar(Value::Object(map)) => {
                CompactRecord::from_json_map(map.clone()).ok()
            }
            _ => None,
        }
    }

    /// Views this value as a record sequence, if it has that shape.
    pub fn as_records(&self) -> Option<Vec<CompactRecord>> {
        match self {
            CompactValue::Records(records) => Some(records.clone()),
            CompactValue::Scalar(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => CompactRecord::from_json_map(map.clone()).ok(),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Short shape name for diagnostics
    pub fn shape_name(&self) -> &'static str {
        match self {
            CompactValue::Scalar(value) => json_type_name(value),
            CompactValue::Record(_) => "record",
            CompactValue::Records(_) => "sequence",
        }
    }
}

impl<'de> Deserialize<'de> for CompactValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(CompactValue::from_json)
    }
}

impl From<Value> for CompactValue {
    fn from(value: Value) -> Self {
        CompactValue::Scalar(value)
    }
}

impl From<CompactRecord> for CompactValue {
    fn from(record: CompactRecord) -> Self {
        CompactValue::Record(record)
    }
}

impl From<Vec<CompactRecord>> for CompactValue {
    fn from(records: Vec<CompactRecord>) -> Self {
        CompactValue::Records(records)
    }
}

/// Minimized record: key codes to compact values, ordered by key code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactRecord(BTreeMap<KeyCode, CompactValue>);

impl CompactRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value
    pub fn insert(&mut self, key: KeyCode, value: impl Into<CompactValue>) -> Option<CompactValue> {
        self.0.insert(key, value.into())
    }

    /// Builder-style `insert`
    pub fn with(mut self, key: KeyCode, value: impl Into<CompactValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: KeyCode) -> Option<&CompactValue> {
        self.0.get(&key)
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (KeyCode, &CompactValue)> {
        self.0.iter().map(|(key, value)| (*key, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowers the record to a JSON object keyed by decimal key codes.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_json()))
                .collect(),
        )
    }

    /// Converts a JSON object keyed by decimal key codes. Hands the map back
    /// untouched if any key is not a key code.
    fn from_json_map(map: Map<String, Value>) -> Result<Self, Map<String, Value>> {
        if !map.keys().all(|k| parse_key(k).is_some()) {
            return Err(map);
        }
        let entries = map
            .into_iter()
            .filter_map(|(k, v)| parse_key(&k).map(|key| (key, CompactValue::from_json(v))))
            .collect();
        Ok(CompactRecord(entries))
    }
}

impl FromIterator<(KeyCode, CompactValue)> for CompactRecord {
    fn from_iter<T: IntoIterator<Item = (KeyCode, CompactValue)>>(iter: T) -> Self {
        CompactRecord(iter.into_iter().collect())
    }
}

/// Root record with its out-of-band version header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactDocument {
    pub version: SchemaVersion,
    pub body: CompactRecord,
}

impl CompactDocument {
    pub fn new(version: SchemaVersion, body: CompactRecord) -> Self {
        Self { version, body }
    }
}

/// Parses a key code written in canonical decimal form.
///
/// "01" or "+1" are not key codes: an object using them is scalar data and
/// must come back from the container untouched.
fn parse_key(key: &str) -> Option<KeyCode> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code: KeyCode = key.parse().ok()?;
    (code.to_string() == key).then_some(code)
}

fn lifts_to_record(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty() && map.keys().all(|k| parse_key(k).is_some()),
        _ => false,
    }
}

/// Returns the JSON type name for diagnostics
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_with_decimal_keys() {
        let record = CompactRecord::new()
            .with(0x01, CompactRecord::new().with(0x02, json!("tt0102356")))
            .with(0x02, json!(["Babylon 5"]));
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"1":{"2":"tt0102356"},"2":["Babylon 5"]}"#);
    }

    #[test]
    fn test_record_json_round_trip_lifts_shapes() {
        let record = CompactRecord::new()
            .with(0x01, CompactRecord::new().with(0x03, json!("101")))
            .with(0x02, json!(["Babylon 5"]))
            .with(0x21, vec![CompactRecord::new().with(0x02, json!(["Season 1"]))]);

        let text = serde_json::to_string(&record).unwrap();
        let back: CompactRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_from_json_keeps_plain_objects_scalar() {
        let value = CompactValue::from_json(json!({"studio": "Warner"}));
        assert_eq!(value, CompactValue::Scalar(json!({"studio": "Warner"})));

        let value = CompactValue::from_json(json!(["a", "b"]));
        assert_eq!(value, CompactValue::Scalar(json!(["a", "b"])));

        let value = CompactValue::from_json(json!([]));
        assert_eq!(value, CompactValue::Scalar(json!([])));
    }

    #[test]
    fn test_leading_zero_keys_stay_scalar() {
        let value = CompactValue::from_json(json!({"01": "first", "1": "second"}));
        assert_eq!(value, CompactValue::Scalar(json!({"01": "first", "1": "second"})));
        assert_eq!(value.as_record(), None);

        let value = CompactValue::from_json(json!([{"007": "bond"}]));
        assert_eq!(value, CompactValue::Scalar(json!([{"007": "bond"}])));
    }

    #[test]
    fn test_empty_shapes_still_view_as_records() {
        assert_eq!(
            CompactValue::Scalar(json!({})).as_record(),
            Some(CompactRecord::new())
        );
        assert_eq!(CompactValue::Scalar(json!([])).as_records(), Some(vec![]));
        assert_eq!(CompactValue::Scalar(json!("x")).as_records(), None);
        assert_eq!(CompactValue::Scalar(json!([{"a": 1}])).as_records(), None);
    }

    #[test]
    fn test_to_json_lowers_nested_shapes() {
        let value = CompactValue::Records(vec![CompactRecord::new().with(0x01, json!(5))]);
        assert_eq!(value.to_json(), json!([{"1": 5}]));
        assert_eq!(value.shape_name(), "sequence");
    }

    #[test]
    fn test_document_header() {
        let document = CompactDocument::new(0x01, CompactRecord::new().with(0x02, json!(["x"])));
        let text = serde_json::to_string(&document).unwrap();
        assert_eq!(text, r#"{"version":1,"body":{"2":["x"]}}"#);
    }

    #[test]
    fn test_parse_key_rejects_non_decimal() {
        assert_eq!(parse_key("33"), Some(33));
        assert_eq!(parse_key("0x21"), None);
        assert_eq!(parse_key("-1"), None);
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("70000"), None);
        assert_eq!(parse_key("0"), Some(0));
        assert_eq!(parse_key("01"), None);
        assert_eq!(parse_key("001"), None);
    }
}
