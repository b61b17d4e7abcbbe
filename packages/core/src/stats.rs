//! Counters exposed by the dispatch manager.

use serde::{Deserialize, Serialize};

/// Snapshot of admission state and lifetime counters.
///
/// `running` and `queued` come from one read of the admission queue; the
/// lifetime counters are read independently and may lag by a few events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchStats {
    /// Units admitted and not yet finished.
    pub running: u64,
    /// Units waiting for a free slot.
    pub queued: u64,
    /// Concurrency limit, `0` when admission control is off.
    pub capacity: u64,
    /// Creation events accepted.
    pub created: u64,
    /// Creations answered from the cache.
    pub cache_hits: u64,
    /// Payloads handed to result delivery.
    pub delivered: u64,
    /// Finish outcomes reported by the worker pool.
    pub finished: u64,
    /// Timeout outcomes reported by the worker pool.
    pub timed_out: u64,
    /// Queued units removed before they ran.
    pub cancelled: u64,
}

impl DispatchStats {
    /// Units held by the dispatcher (queued + running).
    pub fn active(&self) -> u64 {
        self.running + self.queued
    }

    /// Whether a concurrency limit is in force.
    pub fn is_bounded(&self) -> bool {
        self.capacity > 0
    }
}
