//! Tracking statistics about a series of events.
//!
//! An event could be handling of a request and the value associated with the
//! event (the value passed to `add`) could be the amount of time spent serving
//! that request.

use parking_lot::Mutex;
use serde::Serialize;

use tally_utils::{thread_index, CachePadded};

// Writers of different threads update different stripes to avoid contention.
// Readers merge all stripes one by one, without blocking the whole
// distribution, so concurrent additions of other threads may be partially
// observed. Additions made by the reading thread are always observed.
const STRIPES: usize = 8;

/// A metric for tracking events. All operations are thread-safe.
pub struct Distribution {
    stripes: [CachePadded<Mutex<Accumulator>>; STRIPES],
}

/// The statistical summary of the events tracked by a [`Distribution`].
///
/// An empty distribution is summarized as all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    /// The number of events.
    pub count: u64,
    /// The sum of all values.
    pub sum: f64,
    /// The arithmetic mean of all values.
    pub mean: f64,
    /// The population variance of all values.
    pub variance: f64,
    /// The minimum value.
    pub min: f64,
    /// The maximum value.
    pub max: f64,
}

impl Distribution {
    /// Creates a new, empty distribution.
    pub fn new() -> Self {
        Self {
            stripes: std::array::from_fn(|_| CachePadded(Mutex::new(Accumulator::default()))),
        }
    }

    /// Gets the current statistical summary of the events being tracked.
    pub fn read(&self) -> Summary {
        let mut total = Accumulator::default();
        for stripe in &self.stripes {
            let stripe = *stripe.lock();
            total.merge(&stripe);
        }
        total.summarize()
    }

    /// Adds a value to the distribution.
    #[inline]
    pub fn add(&self, value: f64) {
        self.add_n(value, 1);
    }

    /// Adds the same value to the distribution `count` times.
    pub fn add_n(&self, value: f64, count: u64) {
        if count == 0 {
            return;
        }

        let stripe = &self.stripes[thread_index() % STRIPES];
        stripe.lock().merge(&Accumulator::uniform(value, count));
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Distribution").field(&self.read()).finish()
    }
}

// Running statistics, merged using Chan's parallel variant of Welford's
// algorithm.
#[derive(Clone, Copy)]
struct Accumulator {
    count: u64,
    sum: f64,
    mean: f64,
    m2: f64, // sum of squared deviations from the mean
    min: f64,
    max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.,
            mean: 0.,
            m2: 0.,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    fn uniform(value: f64, count: u64) -> Self {
        Self {
            count,
            sum: value * count as f64,
            mean: value,
            m2: 0.,
            min: value,
            max: value,
        }
    }

    fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }

        if self.count == 0 {
            *self = *other;
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let (n_a, n_b, n) = (self.count as f64, other.count as f64, count as f64);

        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.sum += other.sum;
        self.count = count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    fn summarize(&self) -> Summary {
        if self.count == 0 {
            return Summary::default();
        }

        Summary {
            count: self.count,
            sum: self.sum,
            mean: self.mean,
            variance: self.m2 / self.count as f64,
            min: self.min,
            max: self.max,
        }
    }
}
