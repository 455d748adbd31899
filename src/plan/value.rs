//! Generic parsed plan value.
//!
//! Every scalar is kept as text. Booleans and numbers coming from a typed parser are
//! rendered back to their textual form, so a command such as `y` or a salt such as
//! `1.00` is never reinterpreted by the engine.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanValue {
    Null,
    Scalar(String),
    Seq(Vec<PlanValue>),
    /// Key/value pairs in declaration order
    Map(Vec<(String, PlanValue)>),
}

impl PlanValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        PlanValue::Scalar(text.into())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, PlanValue)>) -> Self {
        PlanValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn seq(items: impl IntoIterator<Item = PlanValue>) -> Self {
        PlanValue::Seq(items.into_iter().collect())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PlanValue::Null => "null",
            PlanValue::Scalar(_) => "scalar",
            PlanValue::Seq(_) => "sequence",
            PlanValue::Map(_) => "mapping",
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            PlanValue::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, PlanValue)]> {
        match self {
            PlanValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// First value stored under `key` in a mapping.
    pub fn get(&self, key: &str) -> Option<&PlanValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(text).map(Self::from)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<serde_yaml::Value>(text).map(Self::from)
    }
}

impl From<serde_json::Value> for PlanValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PlanValue::Null,
            serde_json::Value::Bool(b) => PlanValue::Scalar(b.to_string()),
            serde_json::Value::Number(n) => PlanValue::Scalar(n.to_string()),
            serde_json::Value::String(s) => PlanValue::Scalar(s),
            serde_json::Value::Array(items) => {
                PlanValue::Seq(items.into_iter().map(PlanValue::from).collect())
            }
            serde_json::Value::Object(map) => PlanValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, PlanValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for PlanValue {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => PlanValue::Null,
            serde_yaml::Value::Bool(b) => PlanValue::Scalar(b.to_string()),
            serde_yaml::Value::Number(n) => PlanValue::Scalar(n.to_string()),
            serde_yaml::Value::String(s) => PlanValue::Scalar(s),
            serde_yaml::Value::Sequence(items) => {
                PlanValue::Seq(items.into_iter().map(PlanValue::from).collect())
            }
            serde_yaml::Value::Mapping(map) => PlanValue::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_key_text(k), PlanValue::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => PlanValue::from(tagged.value),
        }
    }
}

fn yaml_key_text(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s,
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

impl fmt::Display for PlanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanValue::Null => write!(f, "null"),
            PlanValue::Scalar(text) => write!(f, "{:?}", text),
            PlanValue::Seq(items) => write!(f, "[{} items]", items.len()),
            PlanValue::Map(entries) => write!(f, "{{{} keys}}", entries.len()),
        }
    }
}
