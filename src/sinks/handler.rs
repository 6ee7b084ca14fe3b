//! Pattern-formatting core shared by the concrete sinks

use super::{Sink, SinkOptions};
use crate::core::context::Context;
use crate::core::error::{LoggerError, Result};
use crate::core::level::Level;
use crate::core::record::Record;
use crate::core::transform::{default_transformer, AttrTransformer, MESSAGE_KEY, TIME_KEY};
use crate::core::value::Attr;
use crate::format::placeholder::{
    build_output, pattern_for_level, placeholder_values, placeholders, ValueDelimiters,
};
use crate::format::serializer::{Encoding, Serializer};
use parking_lot::{Mutex, MutexGuard};
use std::io::{BufWriter, Write};
use std::sync::Arc;

pub type BoxedWriter = BufWriter<Box<dyn Write + Send>>;

/// Writer and working buffer, guarded together by the sink's lock.
pub struct Output {
    pub writer: Option<BoxedWriter>,
    pub buffer: String,
}

/// Renders records through a pattern into a buffered writer.
///
/// Clones and derivations share the options, writer and lock; only the
/// inner serializer differs between them.
///
/// # Example
///
/// ```
/// use multilog::core::{Context, Level, Record};
/// use multilog::sinks::{PatternHandler, Sink, SinkOptions};
///
/// let options = SinkOptions::default().with_pattern("[level] [msg]");
/// let handler = PatternHandler::new(options, std::io::sink(), None);
/// handler.handle(&Context::background(), &Record::new(Level::Info, "ready")).unwrap();
/// ```
#[derive(Clone)]
pub struct PatternHandler {
    options: Arc<SinkOptions>,
    serializer: Serializer,
    output: Arc<Mutex<Output>>,
    name: Arc<str>,
}

impl PatternHandler {
    /// Text-rendering handler over `writer`. Without a transformer the
    /// default one is installed, dropping `time` and `msg` from the working
    /// buffer.
    pub fn new(
        options: SinkOptions,
        writer: impl Write + Send + 'static,
        transformer: Option<AttrTransformer>,
    ) -> Self {
        let transformer =
            transformer.unwrap_or_else(|| default_transformer(&options, [TIME_KEY, MESSAGE_KEY]));
        Self::build(options, Encoding::Text, Some(Box::new(writer)), transformer, "pattern")
    }

    pub(crate) fn build(
        options: SinkOptions,
        encoding: Encoding,
        writer: Option<Box<dyn Write + Send>>,
        transformer: AttrTransformer,
        name: &str,
    ) -> Self {
        let serializer = Serializer::new(encoding, options.add_source, transformer);
        Self {
            options: Arc::new(options),
            serializer,
            output: Arc::new(Mutex::new(Output {
                writer: writer.map(BufWriter::new),
                buffer: String::new(),
            })),
            name: Arc::from(name),
        }
    }

    pub fn options(&self) -> &SinkOptions {
        &self.options
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    pub fn delimiters(&self) -> ValueDelimiters<'_> {
        ValueDelimiters {
            prefix: &self.options.value_prefix_char,
            suffix: &self.options.value_suffix_char,
        }
    }

    pub fn admits(&self, level: Level) -> bool {
        self.options.admits(level)
    }

    /// Take the sink's lock.
    pub fn lock(&self) -> MutexGuard<'_, Output> {
        self.output.lock()
    }

    #[must_use]
    pub fn derive_attrs(&self, attrs: &[Attr]) -> Self {
        Self {
            serializer: self.serializer.with_attrs(attrs),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn derive_group(&self, name: &str) -> Self {
        Self {
            serializer: self.serializer.with_group(name),
            ..self.clone()
        }
    }

    /// Run `render` under the lock with a clean working buffer, clearing it
    /// again afterwards whatever the outcome.
    pub fn with_output<F>(&self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Output) -> Result<()>,
    {
        let mut output = self.lock();
        output.buffer.clear();
        let result = render(&mut *output);
        output.buffer.clear();
        result
    }

    /// Serialize `record` into the working buffer.
    pub fn serialize(&self, record: &Record, buffer: &mut String) -> Result<()> {
        self.serializer
            .render(record, buffer)
            .map_err(|e| LoggerError::render(e.into()))
    }

    fn render_line(&self, output: &mut Output, record: &Record) -> Result<()> {
        let Output { writer, buffer } = output;
        self.serialize(record, buffer)?;

        let pattern = pattern_for_level(record.level, &self.options.pattern);
        let placeholders = placeholders(pattern);
        let values = placeholder_values(buffer, self.serializer.encoding(), record, &placeholders);
        let mut line = build_output(pattern, &values, buffer, record.level, self.delimiters());
        line.push('\n');

        let writer = writer.as_mut().ok_or(LoggerError::NoWriter)?;
        write_flushed(writer, &line)
    }
}

/// Write one rendered record and flush.
pub fn write_flushed(writer: &mut BoxedWriter, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes()).map_err(LoggerError::Write)?;
    writer.flush().map_err(LoggerError::Flush)
}

impl Sink for PatternHandler {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        self.admits(level)
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        if !self.enabled(ctx, record.level) {
            return Ok(());
        }
        self.with_output(|output| self.render_line(output, record))
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        Arc::new(self.derive_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(self.derive_group(name))
    }

    fn options(&self) -> Option<&SinkOptions> {
        Some(&self.options)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::remove_keys;
    use crate::core::value::attr;
    use crate::sinks::test_support::SharedBuffer;
    use std::io;

    fn handler(options: SinkOptions) -> (PatternHandler, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (PatternHandler::new(options, buffer.clone(), None), buffer)
    }

    #[test]
    fn test_renders_pattern_and_residue() {
        let (handler, out) = handler(SinkOptions::default().with_pattern("[level] [msg]"));
        let record = Record::new(Level::Info, "hi").with_attr("user", "john");
        handler.handle(&Context::background(), &record).unwrap();
        assert_eq!(out.contents(), "INFO hi [user=john]\n");
    }

    #[test]
    fn test_gate_skips_lower_levels() {
        let (handler, out) = handler(SinkOptions::default().with_level(Level::Warn));
        handler
            .handle(&Context::background(), &Record::new(Level::Info, "quiet"))
            .unwrap();
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_derivations_share_writer() {
        let (handler, out) = handler(SinkOptions::default().with_pattern("[msg]"));
        let derived = handler.with_attrs(&[attr("req", 1)]).with_group("g");
        derived
            .handle(&Context::background(), &Record::new(Level::Info, "a").with_attr("k", "v"))
            .unwrap();
        handler
            .handle(&Context::background(), &Record::new(Level::Info, "b"))
            .unwrap();
        assert_eq!(out.lines(), ["a [level=INFO req=1 g.k=v]", "b [level=INFO]"]);
    }

    #[test]
    fn test_empty_pattern_uses_level_default_without_mutating_options() {
        let (handler, out) = handler(SinkOptions::default().with_pattern("").with_level(Level::Perf));
        handler
            .handle(&Context::background(), &Record::new(Level::Warn, "w"))
            .unwrap();
        assert!(handler.options().pattern.is_empty());
        let line = out.contents();
        assert!(line.contains(" WARN w"), "{}", line);
    }

    #[test]
    fn test_custom_transformer_replaces_default() {
        let buffer = SharedBuffer::default();
        let handler = PatternHandler::new(SinkOptions::default().with_pattern("[msg]"), buffer.clone(), Some(remove_keys()));
        handler
            .handle(&Context::background(), &Record::new(Level::Error, "only"))
            .unwrap();
        assert_eq!(buffer.contents(), "only\n");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_flush_failure_is_reported_and_buffer_cleared() {
        let handler = PatternHandler::new(SinkOptions::default(), FailingWriter, None);
        let err = handler
            .handle(&Context::background(), &Record::new(Level::Info, "x"))
            .unwrap_err();
        assert!(matches!(err, LoggerError::Flush(_)), "{}", err);
        assert!(handler.lock().buffer.is_empty());
    }
}
