//! Mutable, integer-valued gauges.
//!
//! Gauges are variable values and can be used to track e.g. the current
//! number of concurrent connections.

use std::sync::atomic::{AtomicI64, Ordering};

/// A mutable, integer-valued gauge. All operations are thread-safe.
///
/// A concurrent reader observes some value the gauge had at some point,
/// not necessarily the most recent one.
#[derive(Debug, Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    /// Creates a new, zero initialized, gauge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current value of the gauge.
    #[inline]
    pub fn read(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Increases the gauge by one.
    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    /// Decreases the gauge by one.
    #[inline]
    pub fn decrement(&self) {
        self.subtract(1);
    }

    /// Increases the gauge by the given amount.
    #[inline]
    pub fn add(&self, delta: i64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    /// Decreases the gauge by the given amount.
    #[inline]
    pub fn subtract(&self, delta: i64) {
        self.0.fetch_sub(delta, Ordering::Relaxed);
    }

    /// Sets the gauge to the given value.
    #[inline]
    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Relaxed);
    }
}
