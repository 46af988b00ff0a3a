//! An in-process store of named metrics.
//!
//! Metrics are created or registered in a [`Store`], updated concurrently by
//! their owners and sampled all at once by [`Store::sample_all`]. Metrics
//! computed from one shared value can be registered as a group, see
//! [`Store::register_group`].
//!
//! ```
//! use tally_core::{Store, Value};
//!
//! let store = Store::new();
//! let requests = store.create_counter("requests");
//! let version = store.create_label("version");
//!
//! requests.increment();
//! version.set("1.2.3");
//!
//! let sample = store.sample_all();
//! assert_eq!(sample["requests"], Value::Counter(1));
//! assert_eq!(sample["version"], Value::Label("1.2.3".into()));
//! ```

#[macro_use]
extern crate static_assertions;

pub use tally_utils::time::SystemTime;

pub use crate::{
    boolean::Bool,
    config::StoreConfig,
    counter::Counter,
    distribution::{Distribution, Summary},
    errors::ConfigError,
    gauge::Gauge,
    group::{Extractors, GroupId},
    label::Label,
    recorder::{install_recorder, Recorder},
    runtime::RuntimeStats,
    sample::Sample,
    store::Store,
    timestamp::Timestamp,
    value::{Kind, Value},
};

pub mod config;
pub mod errors;

/// Mockable time sources.
pub mod time {
    pub use tally_utils::time::{Instant, SystemTime};

    #[cfg(any(test, feature = "test-util"))]
    pub use tally_utils::time::{with_mock, TimeMock};
}

mod boolean;
mod counter;
mod distribution;
mod gauge;
mod group;
mod label;
mod recorder;
mod runtime;
mod sample;
mod store;
mod timestamp;
mod value;

#[cfg(feature = "unstable")]
mod allocator;

#[cfg(feature = "unstable")]
pub use allocator::AllocatorStats;

assert_impl_all!(Store: Send, Sync);
assert_impl_all!(Counter: Send, Sync);
assert_impl_all!(Gauge: Send, Sync);
assert_impl_all!(Label: Send, Sync);
assert_impl_all!(Bool: Send, Sync);
assert_impl_all!(Timestamp: Send, Sync);
assert_impl_all!(Distribution: Send, Sync);
assert_impl_all!(Recorder: Send, Sync);
