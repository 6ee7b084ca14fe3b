//! Per-sink options

use super::rotating::RotationPolicy;
use crate::core::error::LoggerError;
use crate::core::level::Level;
use crate::format::placeholder::DEFAULT_FORMAT;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output encoding of a file sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    Text,
    Json,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Text => "text",
            Subtype::Json => "json",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Subtype::Text),
            "json" => Ok(Subtype::Json),
            other => Err(LoggerError::UnknownHandlerSubtype(other.to_string())),
        }
    }
}

/// Everything a sink needs to know about its output.
///
/// # Example
///
/// ```
/// use multilog::core::Level;
/// use multilog::sinks::SinkOptions;
///
/// let options = SinkOptions::default()
///     .with_level(Level::Debug)
///     .with_pattern("[time] [level] [msg]")
///     .with_value_delimiters("<", ">");
/// assert!(options.admits(Level::Info));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SinkOptions {
    /// Minimum severity admitted
    pub level: Level,
    pub subtype: Option<Subtype>,
    pub enabled: bool,
    /// Empty means "use the default pattern for the record's level"
    pub pattern: String,
    /// JSON sinks: keys to emit, e.g. `["[datetime]", "[msg]"]`
    pub pattern_placeholders: Vec<String>,
    pub add_source: bool,
    pub use_single_letter_level: bool,
    pub value_prefix_char: String,
    pub value_suffix_char: String,
    pub file: PathBuf,
    /// Megabytes
    pub max_size: u64,
    pub max_backups: usize,
    /// Days
    pub max_age: u64,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            level: Level::Info,
            subtype: None,
            enabled: true,
            pattern: DEFAULT_FORMAT.to_string(),
            pattern_placeholders: Vec::new(),
            add_source: false,
            use_single_letter_level: false,
            value_prefix_char: String::new(),
            value_suffix_char: String::new(),
            file: PathBuf::new(),
            max_size: 5,
            max_backups: 1,
            max_age: 1,
        }
    }
}

impl SinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record at `level` passes this sink's gate.
    pub fn admits(&self, level: Level) -> bool {
        self.enabled && level >= self.level
    }

    /// Rotation caps derived from `max_size`, `max_backups` and `max_age`.
    /// Compression is always off.
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size_mb(self.max_size)
            .with_max_backups(self.max_backups)
            .with_max_age_days(self.max_age)
            .with_compression(false)
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn with_pattern_placeholders<I, S>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern_placeholders = placeholders.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_add_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    #[must_use]
    pub fn with_single_letter_level(mut self, single_letter: bool) -> Self {
        self.use_single_letter_level = single_letter;
        self
    }

    #[must_use]
    pub fn with_value_delimiters(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.value_prefix_char = prefix.into();
        self.value_suffix_char = suffix.into();
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, max_size: u64, max_backups: usize, max_age: u64) -> Self {
        self.max_size = max_size;
        self.max_backups = max_backups;
        self.max_age = max_age;
        self
    }
}
