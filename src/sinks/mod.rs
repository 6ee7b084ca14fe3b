//! Output destinations
//!
//! Every destination implements [`Sink`]. The console, text file and JSON
//! file sinks share one pattern-formatting core, [`PatternHandler`];
//! [`Aggregator`] fans one record out to many sinks.

use crate::core::context::Context;
use crate::core::error::Result;
use crate::core::level::Level;
use crate::core::record::Record;
use crate::core::value::Attr;
use std::sync::Arc;

pub mod aggregator;
pub mod console;
pub mod handler;
pub mod json_file;
pub mod options;
pub mod rotating;
pub mod text_file;

pub use aggregator::Aggregator;
pub use console::ConsoleSink;
pub use handler::PatternHandler;
pub use json_file::JsonFileSink;
pub use options::{SinkOptions, Subtype};
pub use rotating::{RotatingWriter, RotationPolicy};
pub use text_file::TextFileSink;

/// A log destination.
///
/// Derivations (`with_attrs`, `with_group`) never modify `self`; they
/// return a new sink that shares the original's writer and lock.
pub trait Sink: Send + Sync {
    /// Whether a record at `level` would be handled.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Render and write one record. Returns `Ok` without writing when the
    /// sink is not enabled for the record's level.
    fn handle(&self, ctx: &Context, record: &Record) -> Result<()>;

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink>;

    fn with_group(&self, name: &str) -> Arc<dyn Sink>;

    /// Options the sink was built from, if it has any.
    fn options(&self) -> Option<&SinkOptions> {
        None
    }

    fn name(&self) -> &str;
}

/// Write capability for sinks that render without an `io::Write` writer.
pub trait CustomWrite: Send + Sync {
    /// Receives one complete, newline-terminated rendered record.
    fn custom_write(&self, output: &str) -> Result<()>;
}
