//! Dispatch counters for the logger façade
//!
//! The façade never returns sink errors to its caller. These counters are
//! how an application notices that records are failing or being gated out.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated once per façade call.
///
/// # Example
///
/// ```
/// use multilog::core::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_logged();
/// metrics.record_failed();
///
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.failed_count(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Records handed to the sink graph without error
    total_logged: AtomicU64,

    /// Records for which at least one sink returned an error
    failed_count: AtomicU64,

    /// Records no sink admitted
    filtered_count: AtomicU64,
}

impl DispatchMetrics {
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
            filtered_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    /// Returns the previous value.
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of dispatched records that failed, as a percentage.
    ///
    /// Returns 0.0 if nothing has been dispatched.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.total_logged() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.failed_count.store(0, Ordering::Relaxed);
        self.filtered_count.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            total_logged: AtomicU64::new(self.total_logged()),
            failed_count: AtomicU64::new(self.failed_count()),
            filtered_count: AtomicU64::new(self.filtered_count()),
        }
    }
}
