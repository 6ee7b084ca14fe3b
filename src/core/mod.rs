//! Core logger types and traits

pub mod context;
pub mod error;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod perf;
pub mod record;
pub mod source;
pub mod transform;
pub mod value;

pub use context::Context;
pub use error::{LoggerError, Result};
pub use level::Level;
pub use logger::{default_logger, set_default, ContextLogger, Logger, LoggerApi, LoggerBuilder};
pub use metrics::DispatchMetrics;
pub use perf::{performance_metrics, PerfMetrics};
pub use record::Record;
pub use source::{resolve_source, SourceDescriptor, UNKNOWN_SOURCE};
pub use transform::{
    compose, remove_given_keys, remove_keys, replace_keys, AttrTransformer, LEVEL_KEY, MESSAGE_KEY,
    SOURCE_KEY, TIME_KEY,
};
pub use value::{attr, kv_pairs, Attr, Value, BAD_KEY};
