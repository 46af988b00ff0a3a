//! Wall-clock and monotonic time sources.
//!
//! [`SystemTime`] is used to stamp values, [`Instant`] to measure durations.
//! Both can be frozen in tests, see `with_mock` (requires `test-util`).

mod instant;
mod system;

#[cfg(any(test, feature = "test-util"))]
mod mock;

pub use self::{instant::Instant, system::SystemTime};

#[cfg(any(test, feature = "test-util"))]
pub use self::mock::{with_mock, TimeMock};
