//! YAML configuration and sink construction
//!
//! ```yaml
//! multilog:
//!   handlers:
//!     - type: console
//!       level: info
//!       enabled: true
//!       pattern: "[time] [level] [msg]"
//!     - type: file
//!       subtype: json
//!       level: debug
//!       enabled: true
//!       pattern_placeholders: "[datetime], [level], [source], [msg]"
//!       file: logs/app.json
//!       max_size: 5
//!       max_backups: 7
//!       max_age: 1
//! ```

use crate::core::error::{LoggerError, Result};
use crate::core::level::Level;
use crate::format::placeholder::DEFAULT_FORMAT;
use crate::sinks::{ConsoleSink, JsonFileSink, Sink, SinkOptions, Subtype, TextFileSink};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub const CONSOLE_HANDLER_TYPE: &str = "console";
pub const FILE_HANDLER_TYPE: &str = "file";

/// Rotation size in megabytes when a handler sets none.
pub const DEFAULT_LOG_FILE_SIZE: u64 = 5;
pub const DEFAULT_LOG_FILE_BACKUPS: usize = 1;
/// Backup retention in days when a handler sets none.
pub const DEFAULT_LOG_FILE_AGE: u64 = 1;

/// Root of a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub multilog: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// One configured output. Optional fields left at zero or empty take the
/// defaults applied by [`Config::options_for_handler`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    #[serde(rename = "type")]
    pub handler_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtype: String,
    pub level: String,
    pub enabled: bool,
    pub use_single_letter_level: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    /// Comma-separated placeholder list, e.g. `"[time], [level]"`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern_placeholders: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value_prefix_char: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value_suffix_char: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// Megabytes.
    pub max_size: u64,
    pub max_backups: usize,
    /// Days.
    pub max_age: u64,
}

impl HandlerConfig {
    pub fn new(handler_type: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            handler_type: handler_type.into(),
            level: level.into(),
            enabled: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
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
}

impl Config {
    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid YAML, or
    /// describes an invalid handler
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| LoggerError::config_read(path, e))?;
        Self::from_slice(&data)
    }

    /// Parse and validate a configuration document. An empty document is a
    /// configuration without handlers.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not valid YAML or describes an
    /// invalid handler
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let is_blank = data.iter().all(u8::is_ascii_whitespace);
        let config: Config = if is_blank {
            Config::default()
        } else {
            serde_yaml::from_slice(data)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn handlers(&self) -> &[HandlerConfig] {
        &self.multilog.handlers
    }

    /// Check every handler, then the handler list as a whole.
    ///
    /// # Errors
    ///
    /// Returns the first violation found
    pub fn validate(&self) -> Result<()> {
        self.handlers()
            .iter()
            .enumerate()
            .try_for_each(|(index, handler)| validate_handler(index, handler))?;
        validate_handlers(self.handlers())
    }

    pub fn enabled_handlers(&self) -> Vec<&HandlerConfig> {
        self.handlers().iter().filter(|handler| handler.enabled).collect()
    }

    /// Sink options for one handler, with defaults filled in.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown handler type, level or subtype
    pub fn options_for_handler(&self, handler: &HandlerConfig) -> Result<SinkOptions> {
        let is_file = match handler.handler_type.as_str() {
            CONSOLE_HANDLER_TYPE => false,
            FILE_HANDLER_TYPE => true,
            other => return Err(LoggerError::UnknownHandlerType(other.to_string())),
        };
        let level = parse_level(&handler.level)
            .ok_or_else(|| LoggerError::config("handler", format!("invalid log level '{}'", handler.level)))?;
        let subtype = match (is_file, handler.subtype.as_str()) {
            (false, _) => None,
            (true, "") => Some(Subtype::Text),
            (true, subtype) => Some(subtype.parse()?),
        };
        let pattern = if handler.pattern.is_empty() {
            DEFAULT_FORMAT.to_string()
        } else {
            handler.pattern.clone()
        };
        let placeholders = if handler.pattern_placeholders.is_empty() {
            Vec::new()
        } else {
            trim_spaces(handler.pattern_placeholders.split(','))
        };

        let mut options = SinkOptions::default()
            .with_level(level)
            .with_enabled(handler.enabled)
            .with_pattern(pattern)
            .with_pattern_placeholders(placeholders)
            .with_add_source(is_file)
            .with_single_letter_level(handler.use_single_letter_level)
            .with_value_delimiters(handler.value_prefix_char.as_str(), handler.value_suffix_char.as_str())
            .with_file(PathBuf::from(&handler.file))
            .with_rotation(
                default_if_zero(handler.max_size, DEFAULT_LOG_FILE_SIZE),
                default_if_zero(handler.max_backups, DEFAULT_LOG_FILE_BACKUPS),
                default_if_zero(handler.max_age, DEFAULT_LOG_FILE_AGE),
            );
        options.subtype = subtype;
        Ok(options)
    }
}

impl FromStr for Config {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

fn parse_level(level: &str) -> Option<Level> {
    level.parse().ok()
}

/// Check one handler in isolation. `index` is its position in the list.
///
/// # Errors
///
/// Returns an invalid configuration error naming the handler
pub fn validate_handler(index: usize, handler: &HandlerConfig) -> Result<()> {
    let component = format!("handler #{}", index + 1);
    match handler.handler_type.as_str() {
        CONSOLE_HANDLER_TYPE | FILE_HANDLER_TYPE => {}
        other => {
            return Err(LoggerError::config(component, format!("invalid handler type '{}'", other)));
        }
    }
    if parse_level(&handler.level).is_none() {
        return Err(LoggerError::config(
            component,
            format!("invalid log level '{}'", handler.level),
        ));
    }
    if handler.handler_type == FILE_HANDLER_TYPE {
        if handler.file.is_empty() {
            return Err(LoggerError::config(component, "file handler requires a file"));
        }
        if !matches!(handler.subtype.as_str(), "" | "text" | "json") {
            return Err(LoggerError::config(
                component,
                format!("invalid file handler subtype '{}'", handler.subtype),
            ));
        }
    }
    Ok(())
}

/// Rules spanning the whole handler list.
///
/// # Errors
///
/// Returns error if more than one console handler is configured
pub fn validate_handlers(handlers: &[HandlerConfig]) -> Result<()> {
    let consoles = handlers
        .iter()
        .filter(|handler| handler.handler_type == CONSOLE_HANDLER_TYPE)
        .count();
    if consoles > 1 {
        return Err(LoggerError::config(
            "handlers",
            format!("only one console handler is allowed, found {}", consoles),
        ));
    }
    Ok(())
}

/// Instantiate every enabled handler, in document order. Nothing is
/// returned unless all of them succeed.
///
/// # Errors
///
/// Returns the first handler that cannot be built
pub fn create_sinks(config: &Config) -> Result<Vec<Arc<dyn Sink>>> {
    config
        .enabled_handlers()
        .into_iter()
        .map(|handler| {
            let options = config.options_for_handler(handler)?;
            create_sink(&handler.handler_type, options)
        })
        .collect()
}

/// Instantiate one sink of `handler_type` (`console` or `file`).
///
/// # Errors
///
/// Returns error for an unknown type, or if a file sink cannot open its file
pub fn create_sink(handler_type: &str, options: SinkOptions) -> Result<Arc<dyn Sink>> {
    match handler_type {
        CONSOLE_HANDLER_TYPE => Ok(Arc::new(ConsoleSink::new(options))),
        FILE_HANDLER_TYPE => match options.subtype.unwrap_or(Subtype::Text) {
            Subtype::Text => Ok(Arc::new(TextFileSink::new(options)?)),
            Subtype::Json => Ok(Arc::new(JsonFileSink::new(options)?)),
        },
        other => Err(LoggerError::UnknownHandlerType(other.to_string())),
    }
}

pub fn default_if_zero<T: Default + PartialEq>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

pub fn trim_spaces<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|value| value.as_ref().trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_complex_config() {
        let dir = tempdir().unwrap();
        let document = format!(
            r#"multilog:
  handlers:
    - type: console
      level: info
      enabled: true
      pattern: "[datetime] [[level]] [msg]"
    - type: file
      subtype: text
      level: error
      enabled: true
      pattern: "[date] - [[time]] [[level]] [[source]] [msg]"
      file: {}
      max_size: 5 # MB
      max_backups: 7
      max_age: 1 # days
    - type: file
      subtype: json
      level: debug
      enabled: true
      pattern_placeholders: "[datetime], [level], [source], [msg]"
      file: {}
"#,
            dir.path().join("error.log").display(),
            dir.path().join("test.json").display()
        );
        let path = dir.path().join("config.yaml");
        fs::write(&path, document).unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.handlers().len(), 3);
        assert_eq!(config.handlers()[1].max_backups, 7);

        let json = config.options_for_handler(&config.handlers()[2]).unwrap();
        assert_eq!(json.subtype, Some(Subtype::Json));
        assert_eq!(json.pattern_placeholders, ["[datetime]", "[level]", "[source]", "[msg]"]);
        assert_eq!(json.level, Level::Debug);

        let sinks = create_sinks(&config).unwrap();
        let names: Vec<&str> = sinks.iter().map(|sink| sink.name()).collect();
        assert_eq!(names, ["console", "file", "json"]);
    }

    #[test]
    fn test_read_and_parse_errors() {
        let err = Config::from_path("nonexistent_file.yaml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));

        let err = ":invalid_yaml".parse::<Config>().unwrap_err();
        assert!(err.to_string().contains("failed to unmarshal config"), "{}", err);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!("".parse::<Config>().unwrap(), Config::default());
        assert!("  \n".parse::<Config>().unwrap().handlers().is_empty());
    }

    #[test]
    fn test_invalid_handler_in_document() {
        let err = "multilog:\n  handlers:\n    - type: unknown\n      level: info\n      enabled: true\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(err.to_string().contains("invalid config"), "{}", err);
        assert!(err.to_string().contains("handler #1"), "{}", err);
    }

    #[test]
    fn test_validate_handler() {
        assert!(validate_handler(0, &HandlerConfig::new("console", "info")).is_ok());
        // console ignores subtype
        assert!(validate_handler(0, &HandlerConfig::new("console", "info").with_subtype("json")).is_ok());

        let cases = [
            (HandlerConfig::new("unknown", "info"), "invalid handler type"),
            (HandlerConfig::new("console", "invalid"), "invalid log level"),
            (HandlerConfig::new("file", ""), "invalid log level"),
            (HandlerConfig::new("file", "info"), "file handler requires a file"),
            (
                HandlerConfig::new("file", "info").with_file("test.log").with_subtype("invalid"),
                "invalid file handler subtype",
            ),
        ];
        for (handler, expected) in cases {
            let err = validate_handler(0, &handler).unwrap_err();
            assert!(err.to_string().contains(expected), "{} vs {}", err, expected);
        }
    }

    #[test]
    fn test_only_one_console_handler() {
        let handlers = [HandlerConfig::new("console", "info"), HandlerConfig::new("console", "debug")];
        let err = validate_handlers(&handlers).unwrap_err();
        assert!(err.to_string().contains("only one console handler"));

        let handlers = [
            HandlerConfig::new("console", "info"),
            HandlerConfig::new("file", "debug").with_file("a.log"),
            HandlerConfig::new("file", "error").with_file("b.log").with_subtype("json"),
        ];
        assert!(validate_handlers(&handlers).is_ok());
    }

    #[test]
    fn test_enabled_handlers() {
        let config = Config {
            multilog: LogConfig {
                handlers: vec![
                    HandlerConfig::new("console", "info"),
                    HandlerConfig::new("file", "warn").with_enabled(false),
                ],
            },
        };
        let enabled = config.enabled_handlers();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].handler_type, "console");
    }

    #[test]
    fn test_options_for_handler() {
        let mut handler = HandlerConfig::new("file", "info")
            .with_subtype("text")
            .with_file("app.log")
            .with_pattern("[time] [level]");
        handler.use_single_letter_level = true;
        handler.pattern_placeholders = " [time], [level] ".to_string();

        let options = Config::default().options_for_handler(&handler).unwrap();
        assert_eq!(options.level, Level::Info);
        assert!(options.enabled);
        assert_eq!(options.pattern, "[time] [level]");
        assert_eq!(options.pattern_placeholders, ["[time]", "[level]"]);
        assert_eq!(options.file, PathBuf::from("app.log"));
        assert!(options.add_source);
        assert!(options.use_single_letter_level);
    }

    #[test]
    fn test_options_defaults() {
        let handler = HandlerConfig::new("file", "info").with_file("test.log");
        let options = Config::default().options_for_handler(&handler).unwrap();
        assert_eq!(options.max_size, DEFAULT_LOG_FILE_SIZE);
        assert_eq!(options.max_backups, DEFAULT_LOG_FILE_BACKUPS);
        assert_eq!(options.max_age, DEFAULT_LOG_FILE_AGE);
        assert_eq!(options.pattern, DEFAULT_FORMAT);
        assert_eq!(options.subtype, Some(Subtype::Text));
        assert!(options.add_source);
        assert!(!options.use_single_letter_level);

        let console = HandlerConfig::new("console", "warn").with_subtype("json");
        let options = Config::default().options_for_handler(&console).unwrap();
        assert_eq!(options.subtype, None);
        assert!(!options.add_source);
    }

    #[test]
    fn test_unknown_type_and_subtype() {
        let err = Config::default()
            .options_for_handler(&HandlerConfig::new("invalid", "info"))
            .unwrap_err();
        assert!(err.to_string().contains("unknown handler type"));

        let err = Config::default()
            .options_for_handler(&HandlerConfig::new("file", "info").with_subtype("invalid"))
            .unwrap_err();
        assert!(err.to_string().contains("unknown handler subtype"));

        let config = Config {
            multilog: LogConfig {
                handlers: vec![HandlerConfig::new("invalid", "info")],
            },
        };
        assert!(create_sinks(&config).is_err());

        let err = create_sink("unknown", SinkOptions::default()).err().unwrap();
        assert!(err.to_string().contains("unknown handler type"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(default_if_zero(0, 10), 10);
        assert_eq!(default_if_zero(5, 10), 5);
        assert_eq!(trim_spaces([" [time] ", "  [level]  ", "[msg] "]), ["[time]", "[level]", "[msg]"]);
        assert!(trim_spaces(Vec::<String>::new()).is_empty());
    }
}
