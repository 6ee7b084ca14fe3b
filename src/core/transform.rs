//! Attribute transformers
//!
//! A transformer sees every attribute the inner serializer is about to
//! emit, together with the group path it sits under, and returns either a
//! replacement or `None` to drop it. Built-in attributes (`time`, `level`,
//! `msg`, `source`) are offered with an empty group path.

use super::value::{Attr, Value};
use crate::sinks::SinkOptions;
use std::collections::HashMap;
use std::sync::Arc;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const MESSAGE_KEY: &str = "msg";
pub const SOURCE_KEY: &str = "source";

/// `(group path, attribute) -> replacement | dropped`
pub type AttrTransformer = Arc<dyn Fn(&[String], Attr) -> Option<Attr> + Send + Sync>;

/// Rename keys found in `replace_map`; everything else passes through.
pub fn replace_keys(replace_map: HashMap<String, String>) -> AttrTransformer {
    Arc::new(move |_, mut attr| {
        if let Some(key) = replace_map.get(&attr.key) {
            attr.key = key.clone();
        }
        Some(attr)
    })
}

/// Drop the four built-in keys.
pub fn remove_keys() -> AttrTransformer {
    remove_given_keys([TIME_KEY, LEVEL_KEY, SOURCE_KEY, MESSAGE_KEY])
}

pub fn remove_given_keys<I, S>(keys: I) -> AttrTransformer
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    Arc::new(move |_, attr| {
        if keys.iter().any(|key| *key == attr.key) {
            None
        } else {
            Some(attr)
        }
    })
}

/// Drop `attr` when its key equals `key`.
pub fn remove(key: &str, attr: Attr) -> Option<Attr> {
    (attr.key != key).then_some(attr)
}

pub fn remove_key(key: &'static str) -> AttrTransformer {
    Arc::new(move |_, attr| remove(key, attr))
}

pub fn remove_time_key() -> AttrTransformer {
    remove_key(TIME_KEY)
}

pub fn remove_level_key() -> AttrTransformer {
    remove_key(LEVEL_KEY)
}

pub fn remove_source_key() -> AttrTransformer {
    remove_key(SOURCE_KEY)
}

pub fn remove_message_key() -> AttrTransformer {
    remove_key(MESSAGE_KEY)
}

/// Apply `first`, then `second` to whatever survives.
pub fn compose(first: AttrTransformer, second: AttrTransformer) -> AttrTransformer {
    Arc::new(move |groups, attr| first(groups, attr).and_then(|attr| second(groups, attr)))
}

/// The transformer a sink installs when none is supplied.
///
/// Drops `keys_to_remove`, renders `level` as its upper-case name (or its
/// first letter when the sink asks for single letters) and, for sinks that
/// add sources, flattens a source descriptor to `<file>:<line>:<function>`.
pub fn default_transformer<I, S>(options: &SinkOptions, keys_to_remove: I) -> AttrTransformer
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys_to_remove.into_iter().map(Into::into).collect();
    let single_letter = options.use_single_letter_level;
    let add_source = options.add_source;

    Arc::new(move |_, mut attr| {
        if keys.iter().any(|key| *key == attr.key) {
            return None;
        }
        if attr.key == LEVEL_KEY {
            if let Value::Level(level) = attr.value {
                attr.value = Value::String(level.display_name(single_letter).to_string());
            }
        }
        if add_source && attr.key == SOURCE_KEY {
            if let Value::Source(source) = &attr.value {
                if !source.file.is_empty() {
                    attr.value = Value::String(source.render());
                }
            }
        }
        Some(attr)
    })
}
