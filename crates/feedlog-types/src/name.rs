use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::SubfeedHash;

/// Prefix marking a subfeed name that already is its hash.
pub const LITERAL_HASH_PREFIX: char = '~';

/// Name of a subfeed: a plain string, or any structured JSON value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubfeedName {
    Text(String),
    Structured(Value),
}

impl SubfeedName {
    /// The hash carried by a `~<hash>` name, if this is one.
    pub fn literal_hash(&self) -> Option<&str> {
        match self {
            Self::Text(s) => s.strip_prefix(LITERAL_HASH_PREFIX),
            Self::Structured(_) => None,
        }
    }

    /// The string used in URIs: the text itself, or `~<hash>` for
    /// structured names.
    pub fn uri_form(&self, hash: &SubfeedHash) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Structured(_) => format!("{LITERAL_HASH_PREFIX}{hash}"),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Structured(_) => None,
        }
    }
}

impl From<&str> for SubfeedName {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SubfeedName {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Value> for SubfeedName {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }
}

impl fmt::Display for SubfeedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_hash_detected() {
        let name = SubfeedName::from("~0123");
        assert_eq!(name.literal_hash(), Some("0123"));
        assert_eq!(SubfeedName::from("events").literal_hash(), None);
    }

    #[test]
    fn json_string_becomes_text() {
        let name = SubfeedName::from(json!("events"));
        assert_eq!(name, SubfeedName::Text("events".into()));
    }

    #[test]
    fn structured_uri_form_uses_hash() {
        let name = SubfeedName::from(json!({"kind": "log"}));
        let hash = SubfeedHash::from_literal("ab".repeat(20));
        assert_eq!(name.uri_form(&hash), format!("~{}", "ab".repeat(20)));
        assert_eq!(SubfeedName::from("events").uri_form(&hash), "events");
    }

    #[test]
    fn untagged_serde() {
        let text: SubfeedName = serde_json::from_str("\"events\"").unwrap();
        assert_eq!(text.as_text(), Some("events"));
        let structured: SubfeedName = serde_json::from_str(r#"{"a":1}"#).unwrap();
        assert!(matches!(structured, SubfeedName::Structured(_)));
    }
}
