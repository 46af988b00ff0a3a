//! Mutable boolean flags.

use std::sync::atomic::{AtomicBool, Ordering};

/// A mutable, false initialized, flag. All operations are thread-safe.
#[derive(Debug, Default)]
pub struct Bool(AtomicBool);

impl Bool {
    /// Creates a new, false initialized, flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current value of the flag.
    #[inline]
    pub fn read(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sets the flag to the given value.
    #[inline]
    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::Relaxed);
    }

    /// Sets the flag to `true`.
    #[inline]
    pub fn set_true(&self) {
        self.set(true);
    }

    /// Sets the flag to `false`.
    #[inline]
    pub fn set_false(&self) {
        self.set(false);
    }

    /// Flips the flag and returns the previous value.
    ///
    /// Concurrent toggles never cancel each other out.
    #[inline]
    pub fn toggle(&self) -> bool {
        self.0.fetch_xor(true, Ordering::Relaxed)
    }
}
