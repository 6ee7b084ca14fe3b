//! Pattern placeholders and line assembly
//!
//! A pattern such as `"[time] [level] [msg]"` names the values a sink
//! prints. Placeholders are `[` + lowercase ASCII letters + `]`; anything
//! else in the pattern is copied through.

use super::serializer::Encoding;
use super::timestamp::TimestampFormat;
use crate::core::level::Level;
use crate::core::perf::performance_metrics;
use crate::core::record::Record;
use crate::core::source::resolve_source;
use crate::core::transform::{LEVEL_KEY, SOURCE_KEY};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_FORMAT: &str = "[time] [level] [msg]";
pub const DEFAULT_PERF_FORMAT: &str = "[time] [level] [perf] [msg]";
pub const DEFAULT_DEBUG_FORMAT: &str = "[time] [level] [perf] [msg] [source]";
pub const DEFAULT_ERROR_FORMAT: &str = "[time] [level] [msg] [source]";

pub const DATE_PLACEHOLDER: &str = "[date]";
pub const TIME_PLACEHOLDER: &str = "[time]";
pub const DATE_TIME_PLACEHOLDER: &str = "[datetime]";
pub const LEVEL_PLACEHOLDER: &str = "[level]";
pub const MSG_PLACEHOLDER: &str = "[msg]";
pub const PERF_PLACEHOLDER: &str = "[perf]";
pub const SOURCE_PLACEHOLDER: &str = "[source]";

/// Placeholder → resolved value.
pub type PlaceholderValues = HashMap<String, String>;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\[[a-z]+\]").expect("placeholder regex is valid"))
}

/// Placeholders of `pattern` in order of appearance.
pub fn placeholders(pattern: &str) -> Vec<String> {
    placeholder_regex()
        .find_iter(pattern)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// `pattern`, or the default pattern for `level` when it is empty.
pub fn pattern_for_level(level: Level, pattern: &str) -> &str {
    if !pattern.is_empty() {
        return pattern;
    }
    match level {
        Level::Perf => DEFAULT_PERF_FORMAT,
        Level::Debug => DEFAULT_DEBUG_FORMAT,
        Level::Error => DEFAULT_ERROR_FORMAT,
        Level::Info | Level::Warn => DEFAULT_FORMAT,
    }
}

/// Resolve each placeholder once.
///
/// `level` and `source` are read out of (and removed from) the working
/// buffer; unrecognized placeholders get no value.
pub fn placeholder_values<S: AsRef<str>>(
    buffer: &mut String,
    encoding: Encoding,
    record: &Record,
    placeholders: &[S],
) -> PlaceholderValues {
    let mut values = PlaceholderValues::with_capacity(placeholders.len());
    for placeholder in placeholders {
        let placeholder = placeholder.as_ref();
        if values.contains_key(placeholder) {
            continue;
        }
        let value = match placeholder {
            DATE_PLACEHOLDER => TimestampFormat::Date.format(&record.time),
            TIME_PLACEHOLDER => TimestampFormat::Time.format(&record.time),
            DATE_TIME_PLACEHOLDER => TimestampFormat::DateTime.format(&record.time),
            LEVEL_PLACEHOLDER => encoding.key_value(buffer, LEVEL_KEY, true),
            MSG_PLACEHOLDER => record.message.clone(),
            PERF_PLACEHOLDER => performance_metrics(),
            SOURCE_PLACEHOLDER => source_value(buffer, encoding, record),
            _ => continue,
        };
        values.insert(placeholder.to_string(), value);
    }
    values
}

/// Value of the `[source]` placeholder for `record`.
pub fn source_value(buffer: &mut String, encoding: Encoding, record: &Record) -> String {
    let extracted = encoding.key_value(buffer, SOURCE_KEY, true);
    resolve_source(record.level, &extracted, record.source.as_ref())
}

/// Wrapping applied to every substituted value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDelimiters<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
}

/// Assemble the output line.
///
/// Substitution is one left-to-right pass, so a value that itself looks
/// like a placeholder is never expanded again. Empty values leave their
/// placeholder in place. PERF records whose pattern lacks `[perf]` get the
/// metrics appended in brackets, and a non-empty `residue` is appended the
/// same way.
pub fn build_output(
    pattern: &str,
    values: &PlaceholderValues,
    residue: &str,
    level: Level,
    delimiters: ValueDelimiters<'_>,
) -> String {
    let mut output = placeholder_regex()
        .replace_all(pattern, |caps: &Captures<'_>| {
            let placeholder = &caps[0];
            match values.get(placeholder) {
                Some(value) if !value.is_empty() => {
                    format!("{}{}{}", delimiters.prefix, value, delimiters.suffix)
                }
                _ => placeholder.to_string(),
            }
        })
        .into_owned();

    if level == Level::Perf && !placeholders(pattern).iter().any(|p| p == PERF_PLACEHOLDER) {
        output.push_str(" [");
        output.push_str(&performance_metrics());
        output.push(']');
    }

    let residue = residue.trim_end_matches('\n');
    if !residue.is_empty() {
        output.push_str(" [");
        output.push_str(residue);
        output.push(']');
    }

    output
}

/// Strip one leading `[` and one trailing `]` from every key.
pub fn remove_placeholder_chars<V>(values: HashMap<String, V>) -> HashMap<String, V> {
    values
        .into_iter()
        .map(|(key, value)| (strip_placeholder_chars(&key).to_string(), value))
        .collect()
}

pub fn strip_placeholder_chars(key: &str) -> &str {
    let key = key.strip_prefix('[').unwrap_or(key);
    key.strip_suffix(']').unwrap_or(key)
}
