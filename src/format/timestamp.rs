//! Timestamp layouts used by placeholders and the inner serializer

use chrono::{DateTime, Local};

/// Layouts understood by the formatter. All render in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `2025-05-29`
    Date,

    /// `10:10:09`
    Time,

    /// `2025-05-29 10:10:09`
    DateTime,

    /// RFC 3339 with milliseconds and offset: `2025-05-29T10:10:09.123+02:00`
    ///
    /// Used for the `time` attribute of the inner serializer.
    Rfc3339Millis,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Date => datetime.format(DATE_FORMAT).to_string(),
            TimestampFormat::Time => datetime.format(TIME_FORMAT).to_string(),
            TimestampFormat::DateTime => datetime.format(DATE_TIME_FORMAT).to_string(),
            TimestampFormat::Rfc3339Millis => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
        }
    }
}
