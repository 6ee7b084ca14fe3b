//! Call-site recovery
//!
//! Records produced through the [`Logger`](super::logger::Logger) façade
//! pass through several wrapper frames before reaching a sink. This module
//! recovers the user's call site from the stack: first from structured
//! frames resolved by the `backtrace` crate, then, failing that, by
//! parsing the standard library's textual backtrace.

use super::level::Level;
use backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Emitted when no call site can be recovered.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Module path shared by every façade wrapper frame.
pub const PACKAGE_PREFIX: &str = "multilog::core::logger";

/// Internal relay every façade call funnels through. A source that names
/// this function points at the logger itself, not at the caller.
pub const RELAY_SYMBOL: &str = "multilog::core::logger::Logger::log";

/// Wrapper method names. The first three belong to the PERF family.
pub const CALL_IDENTIFIERS: [&str; 15] = [
    "perf",
    "perff",
    "perf_context",
    "debug",
    "debugf",
    "debug_context",
    "info",
    "infof",
    "info_context",
    "warn",
    "warnf",
    "warn_context",
    "error",
    "errorf",
    "error_context",
];

const PERF_IDENTIFIERS: usize = 3;

/// Location of a log call: function, file and line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceDescriptor {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl SourceDescriptor {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Capture file and line from a `#[track_caller]` location. The
    /// function name is left empty.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            function: String::new(),
            file: location.file().to_string(),
            line: location.line(),
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    pub fn file_name(&self) -> &str {
        base_name(&self.file)
    }

    /// True when file and function are both known.
    pub fn is_complete(&self) -> bool {
        !self.file.is_empty() && !self.function.is_empty()
    }

    /// `<file>:<line>:<function>`, with `unknown` for a missing function.
    pub fn render(&self) -> String {
        let function = if self.function.is_empty() {
            UNKNOWN_SOURCE
        } else {
            &self.function
        };
        source_value(function, &self.file, self.line)
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_name(), self.line, self.function)
    }
}

/// Base name of a path; the input itself when it has none.
pub fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

/// Format a source value as `<file base name>:<line>:<function>`.
pub fn source_value(function: &str, file: &str, line: u32) -> String {
    format!("{}:{}:{}", base_name(file), line, function)
}

pub fn perf_identifiers() -> &'static [&'static str] {
    &CALL_IDENTIFIERS[..PERF_IDENTIFIERS]
}

pub fn other_identifiers() -> &'static [&'static str] {
    &CALL_IDENTIFIERS[PERF_IDENTIFIERS..]
}

/// Identifier family used to recognize the wrapper frame for `level`.
pub fn identifiers_for(level: Level) -> &'static [&'static str] {
    if level == Level::Perf {
        perf_identifiers()
    } else {
        other_identifiers()
    }
}

/// Resolve the value for the `[source]` placeholder.
///
/// `extracted` is the source string the inner serializer emitted (empty
/// when the sink does not add sources). It is trusted unless it is empty,
/// lacks a function, or names the internal relay.
pub fn resolve_source(
    level: Level,
    extracted: &str,
    recorded: Option<&SourceDescriptor>,
) -> String {
    if is_resolved(extracted) {
        return extracted.to_string();
    }
    if let Some(source) = recorded.filter(|source| source.is_complete()) {
        return source.to_string();
    }
    if let Some(caller) = caller_info(level) {
        return caller.render();
    }
    match recorded {
        Some(source) if !source.file.is_empty() => source.render(),
        _ => UNKNOWN_SOURCE.to_string(),
    }
}

fn is_resolved(extracted: &str) -> bool {
    !extracted.is_empty()
        && extracted != UNKNOWN_SOURCE
        && !extracted.ends_with(':')
        && !extracted.ends_with(UNKNOWN_FUNCTION_SUFFIX)
        && !extracted.ends_with(RELAY_SYMBOL)
}

const UNKNOWN_FUNCTION_SUFFIX: &str = ":unknown";

/// Fill in the function of a call site captured without one.
///
/// A complete `recorded` source is returned as is. Otherwise the stack is
/// walked for the façade caller; when that fails the partial source is
/// returned unchanged.
pub fn complete_source(level: Level, recorded: &SourceDescriptor) -> SourceDescriptor {
    if recorded.is_complete() {
        return recorded.clone();
    }
    caller_info(level).unwrap_or_else(|| recorded.clone())
}

/// Walk the current stack looking for the caller of a façade wrapper.
pub fn caller_info(level: Level) -> Option<SourceDescriptor> {
    let identifiers = identifiers_for(level);
    caller_from_frames(&capture_frames(), identifiers).or_else(|| {
        let trace = std::backtrace::Backtrace::force_capture().to_string();
        caller_from_trace(&trace, identifiers)
    })
}

pub fn perf_caller_info() -> Option<SourceDescriptor> {
    caller_info(Level::Perf)
}

pub fn other_caller_info() -> Option<SourceDescriptor> {
    caller_info(Level::Info)
}

/// Resolve every symbol on the current stack, innermost first.
fn capture_frames() -> Vec<SourceDescriptor> {
    let trace = Backtrace::new();
    trace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|symbol| SourceDescriptor {
            function: symbol.name().map(|name| format!("{:#}", name)).unwrap_or_default(),
            file: symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            line: symbol.lineno().unwrap_or(0),
        })
        .collect()
}

fn is_wrapper_frame(function: &str, identifiers: &[&str]) -> bool {
    let function = strip_hash(function);
    function.contains(PACKAGE_PREFIX)
        && identifiers.iter().any(|identifier| {
            function
                .strip_suffix(identifier)
                .is_some_and(|rest| rest.ends_with("::"))
        })
}

/// Find the outermost wrapper frame and return the frame that called it.
pub fn caller_from_frames(
    frames: &[SourceDescriptor],
    identifiers: &[&str],
) -> Option<SourceDescriptor> {
    let wrapper = frames
        .iter()
        .rposition(|frame| is_wrapper_frame(&frame.function, identifiers))?;
    frames
        .get(wrapper + 1)
        .filter(|caller| !caller.function.is_empty())
        .map(|caller| SourceDescriptor {
            function: strip_hash(&caller.function).to_string(),
            file: caller.file.clone(),
            line: caller.line,
        })
}

/// Textual fallback over the standard library's backtrace format:
///
/// ```text
///    3: multilog::core::logger::Logger::infof
///              at ./src/core/logger.rs:120:9
///    4: app::main
///              at ./src/main.rs:10:5
/// ```
pub fn caller_from_trace(trace: &str, identifiers: &[&str]) -> Option<SourceDescriptor> {
    let lines: Vec<&str> = trace.lines().collect();
    let frames: Vec<SourceDescriptor> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| frame_header(line).is_some())
        .map(|(i, line)| {
            let location = lines
                .get(i + 1)
                .filter(|next| next.trim_start().starts_with("at "))
                .copied()
                .unwrap_or("");
            parse_caller_details(line, location)
        })
        .collect();
    caller_from_frames(&frames, identifiers)
}

fn frame_header(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let (index, rest) = trimmed.split_once(':')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(rest.trim())
}

/// Parse a frame's function line and its `at <path>:<line>:<col>` line.
pub fn parse_caller_details(function_line: &str, file_line: &str) -> SourceDescriptor {
    let function = frame_header(function_line).unwrap_or_else(|| function_line.trim());
    let function = strip_hash(function.split('(').next().unwrap_or(function).trim());

    let location = file_line
        .split_whitespace()
        .find(|token| *token != "at")
        .unwrap_or("");
    let (file, line) = split_location(location);

    SourceDescriptor {
        function: function.to_string(),
        file: file.to_string(),
        line,
    }
}

/// Split `<path>:<line>[:<col>]`.
fn split_location(location: &str) -> (&str, u32) {
    let Some((head, last)) = location.rsplit_once(':') else {
        return (location, 0);
    };
    if let Some((path, line)) = head.rsplit_once(':') {
        if let (Ok(line), Ok(_)) = (line.parse::<u32>(), last.parse::<u32>()) {
            return (path, line);
        }
    }
    (head, last.parse().unwrap_or(0))
}

fn strip_hash(function: &str) -> &str {
    match function.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => {
            head
        }
        _ => function,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/library/std/src/backtrace.rs:312:13
   1: multilog::core::source::caller_info
             at ./src/core/source.rs:150:21
   2: multilog::core::logger::Logger::log
             at ./src/core/logger.rs:95:9
   3: multilog::core::logger::Logger::infof::h0123456789abcdef
             at ./src/core/logger.rs:140:9
   4: app::handlers::serve::h0123456789abcdef
             at /home/dev/app/src/handlers.rs:42:5
   5: app::main
             at /home/dev/app/src/main.rs:7:5";

    #[test]
    fn test_caller_from_trace() {
        let caller = caller_from_trace(TRACE, other_identifiers()).unwrap();
        assert_eq!(caller.function, "app::handlers::serve");
        assert_eq!(caller.file_name(), "handlers.rs");
        assert_eq!(caller.line, 42);
        assert_eq!(caller.render(), "handlers.rs:42:app::handlers::serve");
    }

    #[test]
    fn test_caller_from_trace_wrong_family() {
        assert!(caller_from_trace(TRACE, perf_identifiers()).is_none());
    }

    #[test]
    fn test_outermost_wrapper_wins() {
        let frames = vec![
            SourceDescriptor::new("multilog::core::logger::Logger::info", "logger.rs", 10),
            SourceDescriptor::new("multilog::core::logger::ContextLogger::info", "logger.rs", 20),
            SourceDescriptor::new("app::run", "/src/app.rs", 30),
        ];
        let caller = caller_from_frames(&frames, other_identifiers()).unwrap();
        assert_eq!(caller.function, "app::run");
        assert_eq!(caller.line, 30);
    }

    #[test]
    fn test_relay_is_not_a_wrapper() {
        let frames = vec![
            SourceDescriptor::new(RELAY_SYMBOL, "logger.rs", 10),
            SourceDescriptor::new("app::run", "/src/app.rs", 30),
        ];
        assert!(caller_from_frames(&frames, other_identifiers()).is_none());
    }

    #[test]
    fn test_parse_caller_details() {
        let details = parse_caller_details(
            "  12: app::worker::process(arg)",
            "             at /srv/app/src/worker.rs:88:17",
        );
        assert_eq!(details.function, "app::worker::process");
        assert_eq!(details.file_name(), "worker.rs");
        assert_eq!(details.line, 88);

        let details = parse_caller_details("app::tick", "main.rs:5 +0x1f");
        assert_eq!(details.file, "main.rs");
        assert_eq!(details.line, 5);
    }

    #[test]
    fn test_source_value_formatting() {
        assert_eq!(source_value("app::main", "/a/b/main.rs", 12), "main.rs:12:app::main");
        let partial = SourceDescriptor::new("", "/a/b/lib.rs", 3);
        assert_eq!(partial.to_string(), "lib.rs:3:");
        assert_eq!(partial.render(), "lib.rs:3:unknown");
    }

    #[test]
    fn test_resolve_prefers_extracted_value() {
        assert_eq!(resolve_source(Level::Info, "main.rs:1:app::main", None), "main.rs:1:app::main");
        let recorded = SourceDescriptor::new("app::module", "/x/y.rs", 9);
        assert_eq!(resolve_source(Level::Info, "", Some(&recorded)), "y.rs:9:app::module");
    }

    #[test]
    fn test_resolve_without_wrapper_frames() {
        assert_eq!(resolve_source(Level::Debug, "", None), UNKNOWN_SOURCE);
        let partial = SourceDescriptor::new("", "/x/y.rs", 9);
        assert_eq!(resolve_source(Level::Debug, "", Some(&partial)), "y.rs:9:unknown");
    }

    #[test]
    fn test_unknown_function_is_not_resolved() {
        assert!(!is_resolved("y.rs:9:unknown"));
        assert!(!is_resolved("y.rs:9:"));
        assert!(is_resolved("y.rs:9:app::run"));
    }

    #[test]
    fn test_complete_source_outside_facade() {
        let complete = SourceDescriptor::new("app::run", "/x/y.rs", 9);
        assert_eq!(complete_source(Level::Info, &complete), complete);
        let partial = SourceDescriptor::new("", "/x/y.rs", 9);
        assert_eq!(complete_source(Level::Info, &partial), partial);
    }

    #[test]
    fn test_identifier_families() {
        assert_eq!(identifiers_for(Level::Perf), &["perf", "perff", "perf_context"]);
        assert!(identifiers_for(Level::Error).contains(&"errorf"));
        assert!(!identifiers_for(Level::Error).contains(&"perf"));
    }
}
