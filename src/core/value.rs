//! Attribute values for structured logging

use super::level::Level;
use super::source::SourceDescriptor;
use std::fmt;

/// Key used when an alternating key/value list ends with a dangling value.
pub const BAD_KEY: &str = "!BADKEY";

/// Value type for structured logging attributes
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Level(Level),
    Source(SourceDescriptor),
    /// Opaque reference, captured through its `Debug` rendering.
    Any(String),
}

impl Value {
    /// Capture an arbitrary value through its `Debug` representation.
    pub fn any<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Any(format!("{:?}", value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Value::String(s) | Value::Any(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Uint(u) => serde_json::Value::Number((*u).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Level(level) => serde_json::Value::String(level.to_str().to_string()),
            Value::Source(source) => serde_json::json!({
                "function": source.function,
                "file": source.file,
                "line": source.line,
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Any(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Level(level) => write!(f, "{}", level),
            Value::Source(source) => write!(f, "{}", source),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Uint(u64::from(u))
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Level> for Value {
    fn from(level: Level) -> Self {
        Value::Level(level)
    }
}

impl From<SourceDescriptor> for Value {
    fn from(source: SourceDescriptor) -> Self {
        Value::Source(source)
    }
}

/// A single key/value attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Shorthand for [`Attr::new`].
pub fn attr(key: impl Into<String>, value: impl Into<Value>) -> Attr {
    Attr::new(key, value)
}

/// Pair up an alternating `key, value, key, value, ...` list.
///
/// Non-string keys are rendered to text; a trailing value without a
/// partner is kept under [`BAD_KEY`].
pub fn kv_pairs<I>(args: I) -> Vec<Attr>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let mut attrs = Vec::new();
    let mut args = args.into_iter().map(Into::into);
    while let Some(key) = args.next() {
        match args.next() {
            Some(value) => attrs.push(Attr::new(key.to_string(), value)),
            None => attrs.push(Attr::new(BAD_KEY, key)),
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_pairs() {
        let attrs = kv_pairs(["user", "john", "action", "login"]);
        assert_eq!(attrs, vec![attr("user", "john"), attr("action", "login")]);
    }

    #[test]
    fn test_kv_pairs_dangling_value() {
        let attrs = kv_pairs(["user", "john", "orphan"]);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1], attr(BAD_KEY, "orphan"));
    }

    #[test]
    fn test_json_values() {
        assert_eq!(Value::from(80).to_json_value(), serde_json::json!(80));
        assert_eq!(Value::from(Level::Warn).to_json_value(), serde_json::json!("WARN"));
        assert_eq!(Value::Float(f64::NAN).to_json_value(), serde_json::Value::Null);
        assert_eq!(Value::any(&Some(3)).to_string(), "Some(3)");
    }
}
