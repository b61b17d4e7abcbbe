//! Admission control and dispatch for callback jobs.
//!
//! # Architecture
//!
//! - `AdmissionQueue` - FIFO of units waiting for one of `capacity` slots
//! - `DispatchManager` - creation path, outcome handling and delivery
//! - `WorkerPool` / `ResultDelivery` - collaborators the manager hands work to
//!
//! # Usage
//!
//! ```ignore
//! use dispatch::{DispatchConfig, DispatchManager, Hooks};
//!
//! let manager = DispatchManager::new(
//!     DispatchConfig::with_capacity(4),
//!     Hooks::new(|descriptor| serde_json::Value::Object(descriptor.fields.clone())),
//!     pool,
//!     delivery,
//! );
//! manager.on_create(descriptor);
//! ```

mod config;
mod hooks;
mod manager;
mod pool;
mod queue;

pub use config::DispatchConfig;
pub use hooks::{CacheFn, FactoryFn, FinishFn, Hooks, TransformFn};
pub use manager::{DispatchManager, Outcomes};
pub use pool::{ResultDelivery, WorkerPool};
pub use queue::{Admission, AdmissionQueue, QueueSnapshot};
