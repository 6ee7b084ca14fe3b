//! # multilog
//!
//! A multi-sink structured logging engine. One call fans a record out to a
//! console sink, rotating text files and rotating JSON files, each with its
//! own level gate and line pattern.
//!
//! ## Features
//!
//! - **Pattern formatting**: `"[time] [level] [msg]"` style patterns with
//!   configurable value delimiters and single-letter levels
//! - **PERF level**: below DEBUG, carrying a snapshot of process counters
//! - **Source recovery**: `[source]` resolves to the caller's
//!   `file:line:function`
//! - **YAML configuration**: build every sink from one document
//! - **Rotation**: size-capped files with numbered backups and age pruning
//!
//! ## Example
//!
//! ```
//! use multilog::prelude::*;
//! use std::sync::Arc;
//!
//! let console = ConsoleSink::with_writer(
//!     SinkOptions::default().with_level(Level::Debug),
//!     std::io::sink(),
//! );
//! let logger = Logger::new(vec![Arc::new(console)]);
//! logger.info("hi", &[attr("user", "john")]);
//! logger.warnf(format_args!("Temperature is {} degrees", 80));
//! ```

pub mod config;
pub mod core;
pub mod format;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::config::{create_sinks, Config, HandlerConfig};
    pub use crate::core::{
        attr, default_logger, kv_pairs, set_default, Attr, Context, ContextLogger, DispatchMetrics,
        Level, Logger, LoggerApi, LoggerBuilder, LoggerError, Record, Result, Value,
    };
    pub use crate::sinks::{
        Aggregator, ConsoleSink, CustomWrite, JsonFileSink, Sink, SinkOptions, Subtype,
        TextFileSink,
    };
}

pub use config::Config;
pub use core::{
    attr, default_logger, kv_pairs, set_default, Attr, Context, ContextLogger, Level, Logger,
    LoggerApi, LoggerBuilder, LoggerError, Record, Result, Value,
};
pub use sinks::{Aggregator, ConsoleSink, JsonFileSink, Sink, SinkOptions, TextFileSink};
