//! Fan-out over many sinks

use super::Sink;
use crate::core::context::Context;
use crate::core::error::{LoggerError, Result};
use crate::core::level::Level;
use crate::core::record::Record;
use crate::core::value::Attr;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A sink whose children each receive every record they admit.
///
/// A failing or panicking child does not stop the others; the first error
/// is returned once every child has run.
#[derive(Clone, Default)]
pub struct Aggregator {
    sinks: Vec<Arc<dyn Sink>>,
}

impl Aggregator {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl FromIterator<Arc<dyn Sink>> for Aggregator {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Sink>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Sink for Aggregator {
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(ctx, level))
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if !sink.enabled(ctx, record.level) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| sink.handle(ctx, record)))
                .unwrap_or_else(|payload| {
                    Err(LoggerError::sink_panicked(sink.name(), panic_message(payload.as_ref())))
                });
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Arc<dyn Sink> {
        Arc::new(self.sinks.iter().map(|sink| sink.with_attrs(attrs)).collect::<Aggregator>())
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        Arc::new(self.sinks.iter().map(|sink| sink.with_group(name)).collect::<Aggregator>())
    }

    fn name(&self) -> &str {
        "aggregator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        level: Level,
        handled: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingSink {
        fn new(level: Level) -> (Self, Arc<AtomicUsize>) {
            let handled = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    level,
                    handled: Arc::clone(&handled),
                    fail: false,
                },
                handled,
            )
        }

        fn failing(level: Level) -> (Self, Arc<AtomicUsize>) {
            let (mut sink, handled) = Self::new(level);
            sink.fail = true;
            (sink, handled)
        }
    }

    impl Sink for CountingSink {
        fn enabled(&self, _ctx: &Context, level: Level) -> bool {
            level >= self.level
        }

        fn handle(&self, _ctx: &Context, record: &Record) -> Result<()> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(LoggerError::other(format!("{} failed", record.message)))
            } else {
                Ok(())
            }
        }

        fn with_attrs(&self, _attrs: &[Attr]) -> Arc<dyn Sink> {
            Arc::new(Self {
                level: self.level,
                handled: Arc::clone(&self.handled),
                fail: self.fail,
            })
        }

        fn with_group(&self, _name: &str) -> Arc<dyn Sink> {
            Arc::new(Self {
                level: self.level,
                handled: Arc::clone(&self.handled),
                fail: self.fail,
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct PanickingSink;

    impl Sink for PanickingSink {
        fn enabled(&self, _ctx: &Context, _level: Level) -> bool {
            true
        }

        fn handle(&self, _ctx: &Context, _record: &Record) -> Result<()> {
            panic!("sink exploded");
        }

        fn with_attrs(&self, _attrs: &[Attr]) -> Arc<dyn Sink> {
            Arc::new(PanickingSink)
        }

        fn with_group(&self, _name: &str) -> Arc<dyn Sink> {
            Arc::new(PanickingSink)
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_enabled_is_or_of_children() {
        let (info, _) = CountingSink::new(Level::Info);
        let (error, _) = CountingSink::new(Level::Error);
        let aggregator = Aggregator::new(vec![Arc::new(info), Arc::new(error)]);
        let ctx = Context::background();
        assert!(!aggregator.enabled(&ctx, Level::Debug));
        assert!(aggregator.enabled(&ctx, Level::Info));
        assert!(Aggregator::default().is_empty());
        assert!(!Aggregator::default().enabled(&ctx, Level::Error));
    }

    #[test]
    fn test_handle_only_enabled_children() {
        let (info, info_count) = CountingSink::new(Level::Info);
        let (debug, debug_count) = CountingSink::new(Level::Debug);
        let aggregator = Aggregator::new(vec![Arc::new(info), Arc::new(debug)]);
        aggregator
            .handle(&Context::background(), &Record::new(Level::Debug, "d"))
            .unwrap();
        assert_eq!(info_count.load(Ordering::SeqCst), 0);
        assert_eq!(debug_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_error_is_returned_and_fan_out_completes() {
        let (first, first_count) = CountingSink::failing(Level::Info);
        let (second, second_count) = CountingSink::failing(Level::Info);
        let (third, third_count) = CountingSink::new(Level::Info);
        let aggregator = Aggregator::new(vec![Arc::new(first), Arc::new(second), Arc::new(third)]);

        let err = aggregator
            .handle(&Context::background(), &Record::new(Level::Info, "boom"))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom failed");
        for count in [first_count, second_count, third_count] {
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_panicking_child_is_isolated() {
        let (after, after_count) = CountingSink::new(Level::Info);
        let aggregator = Aggregator::new(vec![Arc::new(PanickingSink), Arc::new(after)]);
        let err = aggregator
            .handle(&Context::background(), &Record::new(Level::Info, "x"))
            .unwrap_err();
        assert!(matches!(err, LoggerError::SinkPanicked { .. }));
        assert!(err.to_string().contains("sink exploded"));
        assert_eq!(after_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_derivations_are_pointwise() {
        let (info, count) = CountingSink::new(Level::Info);
        let aggregator = Aggregator::new(vec![Arc::new(info)]);
        let derived = aggregator.with_attrs(&[Attr::new("k", 1)]).with_group("g");
        assert_eq!(aggregator.len(), 1);
        derived
            .handle(&Context::background(), &Record::new(Level::Info, "x"))
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(derived.name(), "aggregator");
    }

    #[test]
    fn test_derivation_leaves_original_children_unchanged() {
        use crate::sinks::test_support::SharedBuffer;
        use crate::sinks::{ConsoleSink, SinkOptions};

        let out = SharedBuffer::default();
        let options = SinkOptions::default().with_pattern("[level] [msg]");
        let aggregator = Aggregator::new(vec![
            Arc::new(ConsoleSink::with_writer(options.clone(), out.clone())),
            Arc::new(ConsoleSink::with_writer(options, out.clone())),
        ]);
        let derived = aggregator.with_attrs(&[Attr::new("k", 1)]).with_group("g");
        let ctx = Context::background();

        aggregator.handle(&ctx, &Record::new(Level::Info, "before").with_attr("x", 2)).unwrap();
        derived.handle(&ctx, &Record::new(Level::Info, "derived").with_attr("x", 2)).unwrap();
        aggregator.handle(&ctx, &Record::new(Level::Info, "after").with_attr("x", 2)).unwrap();

        assert_eq!(
            out.lines(),
            [
                "INFO before [x=2]",
                "INFO before [x=2]",
                "INFO derived [k=1 g.x=2]",
                "INFO derived [k=1 g.x=2]",
                "INFO after [x=2]",
                "INFO after [x=2]",
            ]
        );
    }
}
