//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by the buffer pool.
///
/// All fields are atomic and updated with `Ordering::Relaxed`: each counter
/// only needs to be exact on its own, not consistent with the others.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Fetches served from a cached frame.
    pub cache_hits: AtomicU64,

    /// Fetches that had to go to a file.
    pub cache_misses: AtomicU64,

    /// Clean pages dropped to make room.
    pub evictions: AtomicU64,

    /// Pages read from files.
    pub pages_read: AtomicU64,

    /// Dirty pages written back to files.
    pub pages_written: AtomicU64,

    /// Pages dropped without write-back (discard or abort).
    pub pages_discarded: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters out for display or comparison.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_discarded: self.pages_discarded.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_discarded: u64,
}

impl StatsSnapshot {
    /// Fraction of fetches served from the pool (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} ({:.1}%) evictions={} read={} written={} discarded={}",
            self.cache_hits,
            self.cache_misses,
            self.hit_rate() * 100.0,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.pages_discarded
        )
    }
}
