//! Core domain types for the callback job dispatcher.
//!
//! This crate contains shared types used across all packages:
//! - JobDescriptor and JobId for inbound requests
//! - WorkUnit and UnitStatus for admitted work
//! - Events and stats for observability

mod error;
mod events;
mod job;
mod stats;
mod unit;

pub use error::DescriptorError;
pub use events::DispatchEvent;
pub use job::{JobDescriptor, JobId};
pub use stats::DispatchStats;
pub use unit::{UnitStatus, WorkUnit};
