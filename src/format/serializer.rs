//! Inner record serializer
//!
//! Every pattern sink first renders the record into a working buffer with
//! this serializer, then pulls individual keys back out of it to fill the
//! pattern. Two encodings exist:
//!
//! - `Text`: one logfmt line, `time=… level=… msg=… source=… k=v …`, with
//!   open groups prefixed onto keys as `group.key`.
//! - `Json`: one JSON object, with open groups nesting as objects.
//!
//! Attributes bound through [`Serializer::with_attrs`] keep the group path
//! that was open when they were bound.

use super::timestamp::TimestampFormat;
use crate::core::record::Record;
use crate::core::source::complete_source;
use crate::core::transform::{AttrTransformer, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY};
use crate::core::value::{Attr, Value};
use serde_json::Map;
use std::fmt::Write as _;
use std::sync::Arc;

/// Shape of the working buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Text,
    Json,
}

#[derive(Debug, Clone)]
struct BoundAttr {
    groups: Vec<String>,
    attr: Attr,
}

/// Renders records into a working buffer. Derivations are cheap clones
/// sharing the transformer.
#[derive(Clone)]
pub struct Serializer {
    encoding: Encoding,
    add_source: bool,
    transformer: AttrTransformer,
    groups: Vec<String>,
    bound: Arc<Vec<BoundAttr>>,
}

impl std::fmt::Debug for Serializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer")
            .field("encoding", &self.encoding)
            .field("add_source", &self.add_source)
            .field("groups", &self.groups)
            .field("bound", &self.bound.len())
            .finish()
    }
}

impl Serializer {
    pub fn new(encoding: Encoding, add_source: bool, transformer: AttrTransformer) -> Self {
        Self {
            encoding,
            add_source,
            transformer,
            groups: Vec::new(),
            bound: Arc::new(Vec::new()),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Derive a serializer that emits `attrs` on every record.
    #[must_use]
    pub fn with_attrs(&self, attrs: &[Attr]) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        let mut bound = (*self.bound).clone();
        bound.extend(attrs.iter().cloned().map(|attr| BoundAttr {
            groups: self.groups.clone(),
            attr,
        }));
        Self {
            bound: Arc::new(bound),
            ..self.clone()
        }
    }

    /// Derive a serializer that nests subsequent attributes under `name`.
    /// An empty name leaves the serializer unchanged.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        let mut derived = self.clone();
        if !name.is_empty() {
            derived.groups.push(name.to_string());
        }
        derived
    }

    /// Render `record` into `out`, newline-terminated.
    pub fn render(&self, record: &Record, out: &mut String) -> serde_json::Result<()> {
        let builtins = self.builtins(record);
        match self.encoding {
            Encoding::Text => {
                self.render_text(builtins, record, out);
                Ok(())
            }
            Encoding::Json => self.render_json(builtins, record, out),
        }
    }

    fn builtins(&self, record: &Record) -> Vec<Attr> {
        let mut builtins = vec![
            Attr::new(TIME_KEY, TimestampFormat::Rfc3339Millis.format(&record.time)),
            Attr::new(LEVEL_KEY, record.level),
            Attr::new(MESSAGE_KEY, record.message.as_str()),
        ];
        if self.add_source {
            if let Some(source) = &record.source {
                builtins.push(Attr::new(SOURCE_KEY, complete_source(record.level, source)));
            }
        }
        builtins
            .into_iter()
            .filter_map(|attr| (self.transformer)(&[], attr))
            .collect()
    }

    /// Every non-builtin attribute with the group path it is emitted under.
    fn grouped_attrs<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = (&'a [String], Attr)> {
        let bound = self
            .bound
            .iter()
            .map(|bound| (bound.groups.as_slice(), bound.attr.clone()));
        let own = record
            .attrs
            .iter()
            .map(move |attr| (self.groups.as_slice(), attr.clone()));
        bound
            .chain(own)
            .filter_map(move |(groups, attr)| (self.transformer)(groups, attr).map(|attr| (groups, attr)))
    }

    fn render_text(&self, builtins: Vec<Attr>, record: &Record, out: &mut String) {
        let mut first = true;
        let mut push = |key: &str, value: &Value| {
            if !first {
                out.push(' ');
            }
            first = false;
            let _ = write!(out, "{}={}", key, quote_text_value(&value.to_string()));
        };

        for attr in &builtins {
            push(&attr.key, &attr.value);
        }
        for (groups, attr) in self.grouped_attrs(record) {
            if groups.is_empty() {
                push(&attr.key, &attr.value);
            } else {
                let key = format!("{}.{}", groups.join("."), attr.key);
                push(&key, &attr.value);
            }
        }
        out.push('\n');
    }

    fn render_json(&self, builtins: Vec<Attr>, record: &Record, out: &mut String) -> serde_json::Result<()> {
        let mut root = Map::new();
        for attr in builtins {
            root.insert(attr.key, attr.value.to_json_value());
        }
        for (groups, attr) in self.grouped_attrs(record) {
            let mut target = &mut root;
            for group in groups {
                let entry = target
                    .entry(group.clone())
                    .or_insert_with(|| serde_json::Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = serde_json::Value::Object(Map::new());
                }
                target = match entry {
                    serde_json::Value::Object(map) => map,
                    _ => unreachable!("entry was just made an object"),
                };
            }
            target.insert(attr.key, attr.value.to_json_value());
        }
        out.push_str(&serde_json::to_string(&root)?);
        out.push('\n');
        Ok(())
    }
}

/// Quote a logfmt value when it is empty or contains whitespace, `"` or `=`.
pub fn quote_text_value(value: &str) -> String {
    if needs_quoting(value) {
        format!("{:?}", value)
    } else {
        value.to_string()
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;
    use crate::core::source::SourceDescriptor;
    use crate::core::transform::{remove_given_keys, remove_keys};
    use crate::core::value::attr;

    fn passthrough() -> AttrTransformer {
        Arc::new(|_, attr| Some(attr))
    }

    #[test]
    fn test_text_order_and_quoting() {
        let serializer = Serializer::new(Encoding::Text, false, remove_given_keys([TIME_KEY]));
        let record = Record::new(Level::Info, "hello world")
            .with_attr("user", "john")
            .with_attr("query", "a=b");
        let mut out = String::new();
        serializer.render(&record, &mut out).unwrap();
        assert_eq!(out, "level=INFO msg=\"hello world\" user=john query=\"a=b\"\n");
    }

    #[test]
    fn test_text_time_is_rfc3339() {
        let serializer = Serializer::new(Encoding::Text, false, passthrough());
        let mut out = String::new();
        serializer.render(&Record::new(Level::Info, "x"), &mut out).unwrap();
        let time = out.split(' ').next().unwrap().strip_prefix("time=").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
    }

    #[test]
    fn test_text_groups_prefix_keys() {
        let serializer = Serializer::new(Encoding::Text, false, remove_keys())
            .with_attrs(&[attr("app", "svc")])
            .with_group("req")
            .with_attrs(&[attr("id", 7)]);
        let record = Record::new(Level::Info, "x").with_attr("path", "/");
        let mut out = String::new();
        serializer.render(&record, &mut out).unwrap();
        assert_eq!(out, "app=svc req.id=7 req.path=/\n");
    }

    #[test]
    fn test_source_only_when_requested() {
        let record = Record::new(Level::Error, "boom")
            .with_source(SourceDescriptor::new("app::run", "/src/run.rs", 3));
        let mut out = String::new();
        Serializer::new(Encoding::Text, true, remove_given_keys([TIME_KEY, MESSAGE_KEY, LEVEL_KEY]))
            .render(&record, &mut out)
            .unwrap();
        assert_eq!(out, "source=run.rs:3:app::run\n");

        out.clear();
        Serializer::new(Encoding::Text, false, remove_given_keys([TIME_KEY, MESSAGE_KEY, LEVEL_KEY]))
            .render(&record, &mut out)
            .unwrap();
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_json_nests_groups() {
        let serializer = Serializer::new(Encoding::Json, false, remove_given_keys([TIME_KEY]))
            .with_group("req")
            .with_attrs(&[attr("id", 7)]);
        let record = Record::new(Level::Warn, "slow").with_attr("ms", 120);
        let mut out = String::new();
        serializer.render(&record, &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["msg"], "slow");
        assert_eq!(parsed["req"]["id"], 7);
        assert_eq!(parsed["req"]["ms"], 120);
        assert!(parsed.get("time").is_none());
    }

    #[test]
    fn test_derivation_leaves_parent_unchanged() {
        let parent = Serializer::new(Encoding::Text, false, remove_keys());
        let _child = parent.with_attrs(&[attr("k", "v")]).with_group("g");
        let mut out = String::new();
        parent.render(&Record::new(Level::Info, "x"), &mut out).unwrap();
        assert_eq!(out, "\n");
        assert!(parent.groups().is_empty());
    }

    #[test]
    fn test_quote_text_value() {
        assert_eq!(quote_text_value("plain"), "plain");
        assert_eq!(quote_text_value(""), "\"\"");
        assert_eq!(quote_text_value("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
