//! Error types for the logging engine

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Handler configuration rejected during validation
    #[error("invalid config for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unmarshal config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("unknown handler type: {0}")]
    UnknownHandlerType(String),

    #[error("unknown handler subtype: {0}")]
    UnknownHandlerSubtype(String),

    /// Rendering or writing a record failed inside a sink
    #[error("failed to handle record: {0}")]
    Render(Box<LoggerError>),

    #[error("failed to write log message: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to flush writer: {0}")]
    Flush(#[source] std::io::Error),

    #[error("no writer available")]
    NoWriter,

    /// Formatter error with format type
    #[error("formatter error ({format_type}): {message}")]
    Formatter {
        format_type: String,
        message: String,
    },

    /// A child sink panicked while handling a record
    #[error("sink '{sink}' panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file sink error for '{path}': {message}")]
    FileSink { path: String, message: String },

    #[error("file rotation failed for '{path}': {message}")]
    FileRotation { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggerError::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure that happened while a sink was handling a record.
    pub fn render(inner: LoggerError) -> Self {
        LoggerError::Render(Box::new(inner))
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Formatter {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    pub fn sink_panicked(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkPanicked {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSink {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
