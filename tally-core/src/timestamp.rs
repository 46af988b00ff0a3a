//! Re-stampable points in time.

use seqlock::SeqLock;

use tally_utils::time::SystemTime;

/// A mutable point in time. All operations are thread-safe.
///
/// Writers are mutually exclusive, readers never block them.
pub struct Timestamp(SeqLock<SystemTime>);

impl Timestamp {
    /// Creates a new timestamp stamped with the current time.
    pub fn new() -> Self {
        Self(SeqLock::new(SystemTime::now()))
    }

    /// Gets the last stamped time.
    #[inline]
    pub fn read(&self) -> SystemTime {
        self.0.read()
    }

    /// Stamps the current time.
    pub fn stamp(&self) {
        let now = SystemTime::now();
        *self.0.lock_write() = now;
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Timestamp").field(&self.read()).finish()
    }
}
