//! Logger façade
//!
//! [`Logger`] turns calls into [`Record`]s and hands them to one sink,
//! usually an [`Aggregator`] over every configured destination. Logging
//! never fails user code: sink errors are counted in [`DispatchMetrics`]
//! and otherwise dropped.

use super::context::Context;
use super::level::Level;
use super::metrics::DispatchMetrics;
use super::record::Record;
use super::source::SourceDescriptor;
use super::value::{Attr, Value};
use crate::config::{create_sinks, Config};
use crate::core::error::Result;
use crate::sinks::{Aggregator, ConsoleSink, Sink, SinkOptions};
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, OnceLock};

static DEFAULT_LOGGER: OnceLock<Logger> = OnceLock::new();

fn call_record(level: Level, message: String, attrs: &[Attr], location: &Location<'_>) -> Record {
    Record::new(level, message)
        .with_attrs(attrs.iter().cloned())
        .with_source(SourceDescriptor::from_location(location))
}

/// Logging methods shared by [`Logger`] and [`ContextLogger`].
///
/// Every method records its caller's file and line. Wrapper frames are
/// kept out of line so the `[source]` placeholder can also recover the
/// calling function from the stack.
pub trait LoggerApi {
    /// Logger that receives the records.
    fn logger(&self) -> &Logger;

    /// Context used when a call does not supply one.
    fn context(&self) -> Option<&Context> {
        None
    }

    /// Send a fully built record.
    fn emit(&self, ctx: Option<&Context>, record: Record) {
        match ctx.or_else(|| self.context()) {
            Some(ctx) => self.logger().log(ctx, record),
            None => self.logger().log(&Context::background(), record),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn perf(&self, message: &str, attrs: &[Attr]) {
        self.emit(None, call_record(Level::Perf, message.to_string(), attrs, Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn debug(&self, message: &str, attrs: &[Attr]) {
        self.emit(None, call_record(Level::Debug, message.to_string(), attrs, Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn info(&self, message: &str, attrs: &[Attr]) {
        self.emit(None, call_record(Level::Info, message.to_string(), attrs, Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn warn(&self, message: &str, attrs: &[Attr]) {
        self.emit(None, call_record(Level::Warn, message.to_string(), attrs, Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn error(&self, message: &str, attrs: &[Attr]) {
        self.emit(None, call_record(Level::Error, message.to_string(), attrs, Location::caller()));
    }

    /// Format-style PERF record, e.g. `logger.perff(format_args!("took {}ms", 12))`.
    #[track_caller]
    #[inline(never)]
    fn perff(&self, args: fmt::Arguments<'_>) {
        self.emit(None, call_record(Level::Perf, fmt::format(args), &[], Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(None, call_record(Level::Debug, fmt::format(args), &[], Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(None, call_record(Level::Info, fmt::format(args), &[], Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(None, call_record(Level::Warn, fmt::format(args), &[], Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(None, call_record(Level::Error, fmt::format(args), &[], Location::caller()));
    }

    #[track_caller]
    #[inline(never)]
    fn perf_context(&self, ctx: &Context, message: &str, attrs: &[Attr]) {
        let record = call_record(Level::Perf, message.to_string(), attrs, Location::caller());
        self.emit(Some(ctx), record);
    }

    #[track_caller]
    #[inline(never)]
    fn debug_context(&self, ctx: &Context, message: &str, attrs: &[Attr]) {
        let record = call_record(Level::Debug, message.to_string(), attrs, Location::caller());
        self.emit(Some(ctx), record);
    }

    #[track_caller]
    #[inline(never)]
    fn info_context(&self, ctx: &Context, message: &str, attrs: &[Attr]) {
        let record = call_record(Level::Info, message.to_string(), attrs, Location::caller());
        self.emit(Some(ctx), record);
    }

    #[track_caller]
    #[inline(never)]
    fn warn_context(&self, ctx: &Context, message: &str, attrs: &[Attr]) {
        let record = call_record(Level::Warn, message.to_string(), attrs, Location::caller());
        self.emit(Some(ctx), record);
    }

    #[track_caller]
    #[inline(never)]
    fn error_context(&self, ctx: &Context, message: &str, attrs: &[Attr]) {
        let record = call_record(Level::Error, message.to_string(), attrs, Location::caller());
        self.emit(Some(ctx), record);
    }
}

/// Structured logger over a single sink.
///
/// Clones share the sink and the dispatch counters.
///
/// # Example
///
/// ```
/// use multilog::prelude::*;
/// use std::sync::Arc;
///
/// let console = ConsoleSink::with_writer(SinkOptions::default(), std::io::sink());
/// let logger = Logger::new(vec![Arc::new(console)]);
/// logger.info("user logged in", &[attr("user", "john")]);
/// logger.infof(format_args!("{} requests served", 3));
/// assert_eq!(logger.metrics().total_logged(), 2);
/// ```
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Sink>,
    fields: Vec<Attr>,
    metrics: Arc<DispatchMetrics>,
}

impl Logger {
    /// Logger over every enabled sink in `sinks`.
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        let aggregator = sinks
            .into_iter()
            .filter(|sink| sink.options().map_or(true, |options| options.enabled))
            .collect::<Aggregator>();
        Self::from_handler(Arc::new(aggregator))
    }

    /// Logger over any sink, used as is.
    pub fn from_handler(handler: Arc<dyn Sink>) -> Self {
        Self {
            handler,
            fields: Vec::new(),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Build every enabled handler of `config` and log to all of them.
    ///
    /// # Errors
    ///
    /// Returns error if a handler cannot be instantiated, e.g. its log file
    /// cannot be opened
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(create_sinks(config)?))
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Underlying sink.
    pub fn handler(&self) -> &Arc<dyn Sink> {
        &self.handler
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Fields bound through [`with_field`](Self::with_field), in order.
    pub fn fields(&self) -> &[Attr] {
        &self.fields
    }

    /// Whether any sink would handle a record at `level`.
    pub fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    /// Logger whose records all carry `key=value`.
    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_fields([Attr::new(key, value)])
    }

    #[must_use]
    pub fn with_fields(&self, fields: impl IntoIterator<Item = Attr>) -> Self {
        let added: Vec<Attr> = fields.into_iter().collect();
        if added.is_empty() {
            return self.clone();
        }
        let mut bound = self.fields.clone();
        bound.extend(added.iter().cloned());
        Self {
            handler: self.handler.with_attrs(&added),
            fields: bound,
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Logger that nests later attributes under `name`.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        Self {
            handler: self.handler.with_group(name),
            fields: self.fields.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Logger bound to `ctx` for calls that do not pass a context.
    pub fn with_context(&self, ctx: Context) -> ContextLogger {
        ContextLogger {
            logger: self.clone(),
            ctx,
        }
    }

    /// Dispatch one record. Every façade call funnels through here.
    pub fn log(&self, ctx: &Context, record: Record) {
        if !self.handler.enabled(ctx, record.level) {
            self.metrics.record_filtered();
            return;
        }
        match self.handler.handle(ctx, &record) {
            Ok(()) => {
                self.metrics.record_logged();
            }
            Err(_) => {
                self.metrics.record_failed();
            }
        }
    }
}

impl LoggerApi for Logger {
    fn logger(&self) -> &Logger {
        self
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handler", &self.handler.name())
            .field("fields", &self.fields)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// A [`Logger`] carrying a context for every call.
#[derive(Debug, Clone)]
pub struct ContextLogger {
    logger: Logger,
    ctx: Context,
}

impl ContextLogger {
    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn into_inner(self) -> Logger {
        self.logger
    }
}

impl LoggerApi for ContextLogger {
    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn context(&self) -> Option<&Context> {
        Some(&self.ctx)
    }
}

/// Builder for constructing a [`Logger`] sink by sink.
///
/// # Example
/// ```
/// use multilog::prelude::*;
///
/// let logger = Logger::builder()
///     .sink(ConsoleSink::with_writer(SinkOptions::default(), std::io::sink()))
///     .field("service", "api")
///     .build();
/// assert_eq!(logger.fields().len(), 1);
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    sinks: Vec<Arc<dyn Sink>>,
    fields: Vec<Attr>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Bind a field to every record of the built logger.
    #[must_use = "builder methods return a new value"]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Attr::new(key, value));
        self
    }

    pub fn build(self) -> Logger {
        Logger::new(self.sinks).with_fields(self.fields)
    }
}

/// Install the process-wide logger. Only the first call succeeds; later
/// calls hand their logger back.
///
/// # Errors
///
/// Returns the given logger if a default is already installed
pub fn set_default(logger: Logger) -> std::result::Result<(), Logger> {
    DEFAULT_LOGGER.set(logger)
}

/// The process-wide logger. Without [`set_default`], the first call
/// installs an INFO console logger.
pub fn default_logger() -> &'static Logger {
    DEFAULT_LOGGER.get_or_init(|| Logger::new(vec![Arc::new(ConsoleSink::new(SinkOptions::default()))]))
}
