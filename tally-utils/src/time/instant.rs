use std::{sync::OnceLock, time::Duration};

use quanta::Clock;

/// A point of a monotonic clock, used to measure durations.
///
/// Backed by the TSC where it's reliable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant(u64);

impl Instant {
    /// Returns the current point of the monotonic clock.
    #[inline]
    pub fn now() -> Self {
        #[cfg(any(test, feature = "test-util"))]
        if let Some(nanos) = super::mock::frozen_nanos() {
            return Self(nanos);
        }

        Self(clock().raw())
    }

    /// Returns the time elapsed since this instant, saturating to zero.
    pub fn elapsed(&self) -> Duration {
        Self::now().duration_since(*self)
    }

    /// Returns the time elapsed from `earlier` to this instant, saturating
    /// to zero.
    #[inline]
    pub fn duration_since(&self, earlier: Self) -> Duration {
        #[cfg(any(test, feature = "test-util"))]
        if super::mock::frozen_nanos().is_some() {
            return Duration::from_nanos(self.0.saturating_sub(earlier.0));
        }

        clock().delta(earlier.0, self.0)
    }
}

fn clock() -> &'static Clock {
    static CLOCK: OnceLock<Clock> = OnceLock::new();
    CLOCK.get_or_init(Clock::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::with_mock;

    #[test]
    fn monotonic() {
        let start = Instant::now();
        let end = Instant::now();
        assert!(end.duration_since(start) < Duration::from_secs(1));
        assert_eq!(start.duration_since(start), Duration::ZERO);
    }

    #[test]
    fn frozen() {
        with_mock(|mock| {
            let start = Instant::now();
            assert_eq!(start.elapsed(), Duration::ZERO);

            mock.advance(Duration::from_secs(3));
            assert_eq!(start.elapsed(), Duration::from_secs(3));
            assert_eq!(start.duration_since(Instant::now()), Duration::ZERO);
        });
    }
}
