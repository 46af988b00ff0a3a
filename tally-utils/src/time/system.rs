use std::time::{Duration, SystemTime as StdSystemTime};

use serde::Serialize;

/// A point of the wall clock with nanosecond precision.
///
/// Serialized as nanoseconds since the unix epoch. Points before the epoch
/// are clamped to it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SystemTime(u64);

impl SystemTime {
    /// 1970-01-01 00:00:00 UTC.
    pub const UNIX_EPOCH: Self = Self(0);

    /// Returns the current point of the wall clock.
    #[inline]
    pub fn now() -> Self {
        #[cfg(any(test, feature = "test-util"))]
        if let Some(nanos) = super::mock::frozen_nanos() {
            return Self(nanos);
        }

        StdSystemTime::now().into()
    }

    /// Creates a point from nanoseconds since the unix epoch.
    #[inline]
    pub const fn from_unix_time_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns whole seconds since the unix epoch.
    #[inline]
    pub fn to_unix_time_secs(&self) -> u64 {
        self.0 / 1_000_000_000
    }

    /// Returns whole milliseconds since the unix epoch.
    #[inline]
    pub fn to_unix_time_millis(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Returns nanoseconds since the unix epoch.
    #[inline]
    pub fn to_unix_time_nanos(&self) -> u64 {
        self.0
    }

    /// Returns the time elapsed from `earlier` to this point, saturating to
    /// zero.
    #[inline]
    pub fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl From<StdSystemTime> for SystemTime {
    fn from(time: StdSystemTime) -> Self {
        let since_epoch = time
            .duration_since(StdSystemTime::UNIX_EPOCH)
            .unwrap_or_default();

        Self(u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl From<SystemTime> for StdSystemTime {
    fn from(time: SystemTime) -> Self {
        StdSystemTime::UNIX_EPOCH + Duration::from_nanos(time.0)
    }
}
