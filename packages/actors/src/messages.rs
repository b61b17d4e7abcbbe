//! Message types for actor communication.

use dispatch::Outcomes;
use dispatch_core::{JobId, WorkUnit};
use ractor::RpcReplyPort;
use serde::{Deserialize, Serialize};

/// Messages for the PoolActor.
#[derive(Debug)]
pub enum PoolMessage {
    /// Execute an admitted unit.
    Run {
        unit: Box<WorkUnit>,
        outcomes: Outcomes,
    },

    /// A spawned execution ended.
    Completed { job_id: JobId, timed_out: bool },

    /// Reload the handler's configuration.
    Reload,

    /// Get pool stats.
    GetStats { reply: RpcReplyPort<PoolStats> },

    /// Shutdown the pool.
    Shutdown,
}

/// Execution counters for the worker pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolStats {
    /// Units currently executing.
    pub in_flight: u64,
    /// Executions that ended with a handler result or error.
    pub completed: u64,
    /// Executions cut off by the timeout.
    pub timed_out: u64,
    /// Reload requests handled.
    pub reloads: u64,
}

/// Error type for pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Failed to spawn worker pool: {0}")]
    Spawn(#[from] ractor::SpawnErr),

    #[error("Actor error: {0}")]
    Actor(String),

    #[error("Timeout")]
    Timeout,
}
