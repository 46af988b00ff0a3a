//! Errors returned by the store.

use derive_more::{Display, Error, IsVariant};

/// An error returned for an invalid [`StoreConfig`](crate::StoreConfig).
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, IsVariant)]
#[non_exhaustive]
pub enum ConfigError {
    /// The namespace is empty, contains whitespace or starts/ends with a dot.
    #[display("invalid namespace {value:?}")]
    InvalidNamespace {
        /// The rejected value.
        value: String,
    },
    /// The runtime prefix is empty, contains whitespace or starts/ends with a
    /// dot.
    #[display("invalid runtime prefix {value:?}")]
    InvalidRuntimePrefix {
        /// The rejected value.
        value: String,
    },
}
