//! Statistics of the running process, sampled as one group.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        OnceLock,
    },
    time::Duration,
};

use tracing::debug;

use tally_utils::{
    time::{Instant, SystemTime},
    CachePadded,
};

use crate::{
    group::{Extractors, GroupId},
    store::Store,
};

static ALLOCATED_BYTES: CachePadded<AtomicU64> = CachePadded(AtomicU64::new(0));
static DEALLOCATED_BYTES: CachePadded<AtomicU64> = CachePadded(AtomicU64::new(0));
static ALLOCATIONS: CachePadded<AtomicU64> = CachePadded(AtomicU64::new(0));
static DEALLOCATIONS: CachePadded<AtomicU64> = CachePadded(AtomicU64::new(0));
static SAMPLES: AtomicU64 = AtomicU64::new(0);

/// A snapshot of the process statistics.
///
/// Allocation statistics are tracked only if `AllocatorStats` (requires the
/// `unstable` feature) is installed as the global allocator, otherwise they
/// are zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct RuntimeStats {
    /// When the snapshot was taken.
    pub sampled_at: SystemTime,
    /// When the statistics started to be collected.
    pub started_at: SystemTime,
    /// Time elapsed since `started_at`.
    pub uptime: Duration,
    /// The number of [`RuntimeStats::gather`] calls in the whole process so
    /// far, including this one. It's shared by all stores.
    pub samples: u64,
    /// Total allocated bytes.
    pub allocated_bytes: u64,
    /// Total deallocated bytes.
    pub deallocated_bytes: u64,
    /// Currently allocated bytes.
    pub live_bytes: u64,
    /// Total number of allocations.
    pub allocations: u64,
    /// Total number of deallocations.
    pub deallocations: u64,
    /// Currently allocated objects.
    pub live_objects: u64,
    /// Resident set size, zero if unknown.
    pub resident_bytes: u64,
    /// Virtual memory size, zero if unknown.
    pub virtual_bytes: u64,
    /// Whether allocations are tracked.
    pub tracking_enabled: bool,
}

impl RuntimeStats {
    /// Takes a snapshot of the process statistics.
    pub fn gather() -> Self {
        let (started_at, started_instant) = process_start();
        let samples = SAMPLES.fetch_add(1, Ordering::Relaxed) + 1;

        // Deallocations are loaded first to avoid observing more deallocated
        // bytes than allocated ones.
        let deallocated_bytes = DEALLOCATED_BYTES.load(Ordering::Relaxed);
        let deallocations = DEALLOCATIONS.load(Ordering::Relaxed);
        let allocated_bytes = ALLOCATED_BYTES.load(Ordering::Relaxed);
        let allocations = ALLOCATIONS.load(Ordering::Relaxed);

        let memory = get_memory_stats().unwrap_or_else(|err| {
            debug!(error = %err, "cannot get memory stats");
            MemoryStats::default()
        });

        Self {
            sampled_at: SystemTime::now(),
            started_at,
            uptime: started_instant.elapsed(),
            samples,
            allocated_bytes,
            deallocated_bytes,
            live_bytes: allocated_bytes.saturating_sub(deallocated_bytes),
            allocations,
            deallocations,
            live_objects: allocations.saturating_sub(deallocations),
            resident_bytes: memory.resident,
            virtual_bytes: memory.size,
            tracking_enabled: allocations > 0,
        }
    }
}

impl Store {
    /// Registers a group of metrics describing the running process, see
    /// [`RuntimeStats`].
    ///
    /// Names are prefixed by [`StoreConfig::runtime_prefix`]:
    ///
    /// | name                   | kind      |
    /// |------------------------|-----------|
    /// | `rts.sampled_at`       | timestamp |
    /// | `rts.started_at`       | timestamp |
    /// | `rts.uptime_ms`        | counter   |
    /// | `rts.samples`          | counter   |
    /// | `rts.allocated_bytes`  | counter   |
    /// | `rts.deallocated_bytes`| counter   |
    /// | `rts.live_bytes`       | gauge     |
    /// | `rts.allocations`      | counter   |
    /// | `rts.deallocations`    | counter   |
    /// | `rts.live_objects`     | gauge     |
    /// | `rts.resident_bytes`   | gauge     |
    /// | `rts.virtual_bytes`    | gauge     |
    /// | `rts.tracking_enabled` | bool      |
    ///
    /// [`StoreConfig::runtime_prefix`]: crate::StoreConfig::runtime_prefix
    pub fn register_runtime_metrics(&self) -> GroupId {
        process_start();

        let prefix = &self.config().runtime_prefix;
        let name = |field: &str| format!("{prefix}.{field}");

        let extractors = Extractors::new()
            .timestamp(name("sampled_at"), |s: &RuntimeStats| s.sampled_at)
            .timestamp(name("started_at"), |s: &RuntimeStats| s.started_at)
            .counter(name("uptime_ms"), |s: &RuntimeStats| {
                saturating_millis(s.uptime)
            })
            .counter(name("samples"), |s: &RuntimeStats| s.samples)
            .counter(name("allocated_bytes"), |s: &RuntimeStats| {
                s.allocated_bytes
            })
            .counter(name("deallocated_bytes"), |s: &RuntimeStats| {
                s.deallocated_bytes
            })
            .gauge(name("live_bytes"), |s: &RuntimeStats| {
                saturating_i64(s.live_bytes)
            })
            .counter(name("allocations"), |s: &RuntimeStats| s.allocations)
            .counter(name("deallocations"), |s: &RuntimeStats| s.deallocations)
            .gauge(name("live_objects"), |s: &RuntimeStats| {
                saturating_i64(s.live_objects)
            })
            .gauge(name("resident_bytes"), |s: &RuntimeStats| {
                saturating_i64(s.resident_bytes)
            })
            .gauge(name("virtual_bytes"), |s: &RuntimeStats| {
                saturating_i64(s.virtual_bytes)
            })
            .bool(name("tracking_enabled"), |s: &RuntimeStats| {
                s.tracking_enabled
            });

        self.register_group(extractors, RuntimeStats::gather)
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn process_start() -> (SystemTime, Instant) {
    static START: OnceLock<(SystemTime, Instant)> = OnceLock::new();
    *START.get_or_init(|| (SystemTime::now(), Instant::now()))
}

#[cfg_attr(not(feature = "unstable"), allow(dead_code))]
#[inline]
pub(crate) fn record_allocation(size: usize) {
    ALLOCATED_BYTES.fetch_add(size as u64, Ordering::Relaxed);
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

#[cfg_attr(not(feature = "unstable"), allow(dead_code))]
#[inline]
pub(crate) fn record_deallocation(size: usize) {
    DEALLOCATED_BYTES.fetch_add(size as u64, Ordering::Relaxed);
    DEALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

// === Memory ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MemoryStats {
    size: u64,
    resident: u64,
}

#[cfg(target_os = "linux")]
use proc_stats::get as get_memory_stats;

#[cfg(not(target_os = "linux"))]
fn get_memory_stats() -> Result<MemoryStats, String> {
    Err("memory stats are supported only on linux".into())
}

#[cfg(target_os = "linux")]
mod proc_stats {
    use std::fs;

    use super::MemoryStats;

    const PROC_SELF_STATM: &str = "/proc/self/statm";
    // TODO: use `sysconf(_SC_PAGESIZE)` to support huge base pages.
    const PAGE_SIZE: u64 = 4096;

    pub(super) fn get() -> Result<MemoryStats, String> {
        let statm = fs::read_to_string(PROC_SELF_STATM)
            .map_err(|err| format!("cannot read {PROC_SELF_STATM}: {err}"))?;

        parse(&statm).ok_or_else(|| format!("cannot parse {PROC_SELF_STATM}"))
    }

    // Format: "size resident shared text lib data dt", all in pages.
    fn parse(statm: &str) -> Option<MemoryStats> {
        let mut fields = statm.split_ascii_whitespace().map(|f| f.parse::<u64>());
        let size = fields.next()?.ok()?;
        let resident = fields.next()?.ok()?;

        Some(MemoryStats {
            size: size * PAGE_SIZE,
            resident: resident * PAGE_SIZE,
        })
    }

    #[test]
    fn it_works() {
        let stats = get().unwrap();
        assert!(stats.size > 0);
        assert!(stats.resident > 0);
        assert!(stats.resident <= stats.size);
    }

    #[test]
    fn parsing() {
        let stats = parse("10 2 1 1 0 5 0\n").unwrap();
        assert_eq!(stats.size, 10 * PAGE_SIZE);
        assert_eq!(stats.resident, 2 * PAGE_SIZE);

        assert!(parse("").is_none());
        assert!(parse("10").is_none());
        assert!(parse("x 2").is_none());
    }
}
