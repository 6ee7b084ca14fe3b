//! Call context threaded from the façade to every sink
//!
//! A `Context` carries request-scoped values and an advisory cancellation
//! flag. Sinks receive it alongside each record; cancellation never causes
//! a sink to abandon a partially written record.

use super::value::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheaply clonable context. Derivations copy the value map; clones share
/// the cancellation flag.
///
/// # Example
///
/// ```
/// use multilog::core::Context;
///
/// let ctx = Context::background().with_value("request_id", "abc-123");
/// assert_eq!(ctx.value("request_id").unwrap().to_string(), "abc-123");
///
/// let child = ctx.clone();
/// ctx.cancel();
/// assert!(child.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Arc<HashMap<String, Value>>,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// The empty, never-cancelled context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context with one more value; `self` is unchanged.
    #[must_use]
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            values: Arc::new(values),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
