//! Rotating text file sink

use super::handler::PatternHandler;
use super::rotating::RotatingWriter;
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

/// Pattern-formatted lines appended to a rotating file.
#[derive(Clone)]
pub struct TextFileSink {
    handler: PatternHandler,
}

impl TextFileSink {
    /// Open `options.file` with rotation caps from the options.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or opened
    pub fn new(options: SinkOptions) -> Result<Self> {
        let writer = RotatingWriter::new(&options.file, options.rotation_policy())?;
        Ok(Self::with_writer(options, writer))
    }

    pub fn with_writer(options: SinkOptions, writer: impl Write + Send + 'static) -> Self {
        let transformer = default_transformer(&options, [TIME_KEY, MESSAGE_KEY]);
        Self {
            handler: PatternHandler::build(
                options,
                Encoding::Text,
                Some(Box::new(writer)),
                transformer,
                "file",
            ),
        }
    }

    pub fn handler(&self) -> &PatternHandler {
        &self.handler
    }
}

impl Sink for TextFileSink {
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
