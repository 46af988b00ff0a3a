//! Mutable, text-valued labels.
//!
//! Labels are variable values and can be used to track e.g. the command line
//! arguments or other free-form values.

use parking_lot::Mutex;

/// A mutable, text-valued label. All operations are thread-safe.
#[derive(Debug, Default)]
pub struct Label(Mutex<String>);

impl Label {
    /// Creates a new empty label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current value of the label.
    pub fn read(&self) -> String {
        self.0.lock().clone()
    }

    /// Sets the label to the given value.
    pub fn set(&self, value: impl Into<String>) {
        *self.0.lock() = value.into();
    }

    /// Sets the label to the result of applying the given function to the
    /// current value.
    ///
    /// Concurrent writers are blocked until `f` returns, so no update is lost.
    /// If `f` panics, the label keeps its current value.
    pub fn modify(&self, f: impl FnOnce(&str) -> String) {
        let mut value = self.0.lock();
        *value = f(&value);
    }
}
