// ── Field values ──
//
// Typed cell of a record. The three sentinels stand in for the strings
// "unknown", "multiple" and "disabled" that consumers historically read;
// those strings only appear when a value is displayed or serialized.

use std::fmt;

use serde::{Serialize, Serializer};

/// A single typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Bool(bool),
    /// The device did not report the value.
    Unknown,
    /// More than one source was seen where one was expected.
    Multiple,
    /// Collection of this value is switched off.
    Disabled,
}

impl FieldValue {
    /// An empty text value (present, but blank).
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Convert a raw JSON scalar. `null` reads as absent.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::Text(n.to_string()), Self::Int),
            ),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Text is parsed, since REST reports counters as strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Only recognised truthy forms count: `true`, non-zero integers and
    /// the text forms `true`, `yes`, `on`, `1` (any case).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            ),
            Self::Unknown | Self::Multiple | Self::Disabled => false,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Unknown | Self::Multiple | Self::Disabled)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Unknown => f.write_str("unknown"),
            Self::Multiple => f.write_str("multiple"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Text(s) => serializer.serialize_str(s),
            sentinel => serializer.collect_str(sentinel),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
