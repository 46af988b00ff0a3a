//! Mutable, integer-valued counters.
//!
//! Counters are non-negative, monotonically increasing values and can be used
//! to track e.g. the number of requests served since program start.

use std::sync::atomic::{AtomicU64, Ordering};

/// A mutable, integer-valued counter. All operations are thread-safe.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new, zero initialized, counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current value of the counter.
    #[inline]
    pub fn read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Increases the counter by one.
    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds the magnitude of the argument to the counter.
    ///
    /// Negative deltas never decrease the counter: `add(-3)` is `add(3)`.
    #[inline]
    pub fn add(&self, delta: i64) {
        self.0.fetch_add(delta.unsigned_abs(), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_unsigned(&self, delta: u64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }
}
