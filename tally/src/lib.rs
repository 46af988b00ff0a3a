//! An in-process store of named metrics.
//!
//! See [`Store`] for the entry point.

pub use tally_core::*;

/// Commonly used types.
pub mod prelude {
    pub use super::{Extractors, Kind, Sample, Store, StoreConfig, Value};
}
