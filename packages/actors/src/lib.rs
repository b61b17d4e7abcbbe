//! Actor-based worker pool for the dispatcher.
//!
//! This crate provides the Ractor-based pool that executes units admitted
//! by the dispatch manager.
//!
//! # Architecture
//!
//! - `PoolActor` - Runs each admitted unit on its own task under a timeout
//! - `ActorWorkerPool` - Handle implementing `dispatch::WorkerPool`
//! - `JobHandler` - What a unit's execution actually does
//!
//! # Usage
//!
//! ```ignore
//! use actors::{ActorWorkerPool, PoolConfig, job_handler};
//!
//! let handler = job_handler!(|unit, _progress| Ok(unit.payload().clone()));
//! let (pool, _handle) = ActorWorkerPool::start(handler, PoolConfig::default()).await?;
//! ```

mod handler;
mod messages;
mod pool;
mod pool_actor;

pub use handler::{FnHandler, HandlerFuture, HandlerResult, JobHandler, Progress};
pub use messages::{PoolError, PoolMessage, PoolStats};
pub use pool::{ActorWorkerPool, PoolConfig};
pub use pool_actor::PoolActor;

#[doc(hidden)]
pub use dispatch_core::WorkUnit;

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef};
