use std::{cell::Cell, time::Duration};

thread_local! {
    // Nanoseconds since the unix epoch, if time is frozen on this thread.
    static FROZEN_NANOS: Cell<Option<u64>> = const { Cell::new(None) };
}

pub(super) fn frozen_nanos() -> Option<u64> {
    FROZEN_NANOS.with(Cell::get)
}

/// Runs `f` with time frozen at the unix epoch on the current thread.
///
/// Both [`SystemTime`](super::SystemTime) and [`Instant`](super::Instant)
/// move only by [`TimeMock::advance`]. Other threads are not affected.
/// Values obtained inside and outside of `f` must not be compared.
pub fn with_mock<R>(f: impl FnOnce(TimeMock) -> R) -> R {
    struct Unfreeze;

    impl Drop for Unfreeze {
        fn drop(&mut self) {
            FROZEN_NANOS.with(|t| t.set(None));
        }
    }

    FROZEN_NANOS.with(|t| t.set(Some(0)));
    let _unfreeze = Unfreeze;
    f(TimeMock(()))
}

/// A handle to the frozen time, see [`with_mock`].
pub struct TimeMock(());

impl TimeMock {
    /// Moves the frozen time forward.
    pub fn advance(&self, duration: Duration) {
        let delta = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        FROZEN_NANOS.with(|t| t.set(Some(t.get().unwrap_or(0).saturating_add(delta))));
    }
}
