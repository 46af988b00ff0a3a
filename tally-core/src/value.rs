//! Sampled values of metrics.

use derive_more::{Display, IsVariant};
use serde::Serialize;

use tally_utils::time::SystemTime;

use crate::distribution::Summary;

/// A kind of a metric, used to annotate sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IsVariant, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// A monotonically non-decreasing integer.
    #[display("counter")]
    Counter,
    /// An integer that can arbitrarily go up and down.
    #[display("gauge")]
    Gauge,
    /// A free-form text.
    #[display("label")]
    Label,
    /// A summary of a series of events.
    #[display("distribution")]
    Distribution,
    /// A point in time.
    #[display("timestamp")]
    Timestamp,
    /// A flag.
    #[display("bool")]
    Bool,
}

/// An actual value of a metric at the moment of sampling.
///
/// The set of variants is closed, so exposition code can match exhaustively.
#[derive(Debug, Clone, PartialEq, IsVariant, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// See [`Kind::Counter`].
    Counter(u64),
    /// See [`Kind::Gauge`].
    Gauge(i64),
    /// See [`Kind::Label`].
    Label(String),
    /// See [`Kind::Bool`].
    Bool(bool),
    /// See [`Kind::Timestamp`].
    Timestamp(SystemTime),
    /// See [`Kind::Distribution`].
    Distribution(Summary),
}

impl Value {
    /// Returns the kind of the value.
    #[inline]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Counter(_) => Kind::Counter,
            Self::Gauge(_) => Kind::Gauge,
            Self::Label(_) => Kind::Label,
            Self::Bool(_) => Kind::Bool,
            Self::Timestamp(_) => Kind::Timestamp,
            Self::Distribution(_) => Kind::Distribution,
        }
    }
}
