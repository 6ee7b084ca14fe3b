//! Log record structure

use super::level::Level;
use super::source::SourceDescriptor;
use super::value::{Attr, Value};
use chrono::{DateTime, Local};

/// One log event, created at the call site and handed to every sink.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Local>,
    pub level: Level,
    pub message: String,
    /// Insertion-ordered; keys may repeat.
    pub attrs: Vec<Attr>,
    pub source: Option<SourceDescriptor>,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(Local::now(), level, message)
    }

    pub fn at(time: DateTime<Local>, level: Level, message: impl Into<String>) -> Self {
        Self {
            time,
            level,
            message: message.into(),
            attrs: Vec::new(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    #[must_use]
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    pub fn with_location(mut self, file: &str, line: u32, module_path: &str) -> Self {
        self.source = Some(SourceDescriptor::new(module_path, file, line));
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.source = Some(source);
        self
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}
