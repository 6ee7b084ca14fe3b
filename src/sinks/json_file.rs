//! Rotating JSON file sink
//!
//! Each record becomes one JSON object per line. The object is the merge of
//! the resolved placeholder values (keys without their brackets) and the
//! record's own attributes, which win on conflicts. Keys come out sorted.

use super::handler::{write_flushed, Output, PatternHandler};
use super::rotating::RotatingWriter;
use super::{CustomWrite, Sink, SinkOptions};
use crate::core::context::Context;
use crate::core::error::{LoggerError, Result};
use crate::core::level::Level;
use crate::core::perf::performance_metrics;
use crate::core::record::Record;
use crate::core::transform::{default_transformer, TIME_KEY};
use crate::core::value::Attr;
use crate::format::placeholder::{
    pattern_for_level, placeholder_values, placeholders, remove_placeholder_chars, PERF_PLACEHOLDER,
};
use crate::format::serializer::Encoding;
use serde_json::{Map, Value as JsonValue};
use std::io::Write;
use std::sync::Arc;

#[derive(Clone)]
pub struct JsonFileSink {
    handler: PatternHandler,
    custom: Option<Arc<dyn CustomWrite>>,
}

impl JsonFileSink {
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
        Self::build(options, Some(Box::new(writer)), None)
    }

    /// A JSON sink that hands every rendered line to `custom` instead of a
    /// writer.
    pub fn with_custom_writer(options: SinkOptions, custom: Arc<dyn CustomWrite>) -> Self {
        Self::build(options, None, Some(custom))
    }

    fn build(
        options: SinkOptions,
        writer: Option<Box<dyn Write + Send>>,
        custom: Option<Arc<dyn CustomWrite>>,
    ) -> Self {
        let transformer = default_transformer(&options, [TIME_KEY]);
        Self {
            handler: PatternHandler::build(options, Encoding::Json, writer, transformer, "json"),
            custom,
        }
    }

    pub fn handler(&self) -> &PatternHandler {
        &self.handler
    }

    /// Placeholders to resolve for `level`: the configured list, or those of
    /// the (level-defaulted) pattern.
    fn effective_placeholders(&self, level: Level) -> Vec<String> {
        let options = self.handler.options();
        if options.pattern_placeholders.is_empty() {
            placeholders(pattern_for_level(level, &options.pattern))
        } else {
            options.pattern_placeholders.clone()
        }
    }

    fn render_object(&self, buffer: &mut String, record: &Record) -> Result<String> {
        self.handler.serialize(record, buffer)?;

        let placeholders = self.effective_placeholders(record.level);
        let mut values = placeholder_values(buffer, Encoding::Json, record, &placeholders);
        if record.level == Level::Perf && !placeholders.iter().any(|p| p == PERF_PLACEHOLDER) {
            values.insert(PERF_PLACEHOLDER.to_string(), performance_metrics());
        }

        let intermediate: Map<String, JsonValue> = serde_json::from_str(buffer).map_err(|e| {
            LoggerError::formatter("JSON", format!("failed to unmarshal values: {}", e))
        })?;

        let mut document: Map<String, JsonValue> = remove_placeholder_chars(values)
            .into_iter()
            .map(|(key, value)| (key, JsonValue::String(value)))
            .collect();
        document.extend(intermediate);

        let mut line = serde_json::to_string(&document)?;
        line.push('\n');
        Ok(line)
    }

    fn write_record(&self, output: &mut Output, record: &Record) -> Result<()> {
        let Output { writer, buffer } = output;
        let line = self.render_object(buffer, record)?;
        match (writer.as_mut(), &self.custom) {
            (Some(writer), _) => write_flushed(writer, &line),
            (None, Some(custom)) => custom.custom_write(&line),
            (None, None) => Err(LoggerError::NoWriter),
        }
    }
}

impl Sink for JsonFileSink {
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        if !self.enabled(ctx, record.level) {
            return Ok(());
        }
        self.handler.with_output(|output| self.write_record(output, record))
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        Arc::new(Self {
            handler: self.handler.derive_attrs(attrs),
            custom: self.custom.clone(),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(Self {
            handler: self.handler.derive_group(name),
            custom: self.custom.clone(),
        })
    }

    fn options(&self) -> Option<&SinkOptions> {
        Some(self.handler.options())
    }

    fn name(&self) -> &str {
        Sink::name(&self.handler)
    }
}
