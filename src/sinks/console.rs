//! Console sink

use super::handler::PatternHandler;
use super::{Sink, SinkOptions};
use crate::core::context::Context;
use crate::core::error::Result;
use crate::core::level::Level;
use crate::core::record::Record;
use crate::core::transform::{default_transformer, MESSAGE_KEY, TIME_KEY};
use crate::core::value::Attr;
use crate::format::serializer::Encoding;
use std::io::Write;
use std::sync::Arc;

/// Pattern-formatted lines on standard output. Console sinks ignore the
/// subtype option.
#[derive(Clone)]
pub struct ConsoleSink {
    handler: PatternHandler,
}

impl ConsoleSink {
    pub fn new(options: SinkOptions) -> Self {
        Self::with_writer(options, std::io::stdout())
    }

    /// Console formatting over any writer.
    ///
    /// # Example
    ///
    /// ```
    /// use multilog::sinks::{ConsoleSink, SinkOptions};
    ///
    /// let sink = ConsoleSink::with_writer(SinkOptions::default(), std::io::stderr());
    /// ```
    pub fn with_writer(options: SinkOptions, writer: impl Write + Send + 'static) -> Self {
        let transformer = default_transformer(&options, [TIME_KEY, MESSAGE_KEY]);
        Self {
            handler: PatternHandler::build(
                options,
                Encoding::Text,
                Some(Box::new(writer)),
                transformer,
                "console",
            ),
        }
    }

    pub fn handler(&self) -> &PatternHandler {
        &self.handler
    }
}

impl Sink for ConsoleSink {
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        self.handler.handle(ctx, record)
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        Arc::new(Self {
            handler: self.handler.derive_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self {
            handler: self.handler.derive_group(name),
        })
    }

    fn options(&self) -> Option<&SinkOptions> {
        Some(self.handler.options())
    }

    fn name(&self) -> &str {
        Sink::name(&self.handler)
    }
}
