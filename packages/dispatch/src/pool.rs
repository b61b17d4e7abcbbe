//! Contracts for the collaborators the manager hands work to.

use dispatch_core::WorkUnit;
use serde_json::Value;

use crate::manager::Outcomes;

/// Executes admitted units.
///
/// `run` must not block the caller; completion is reported exclusively
/// through `outcomes`. A unit stays admitted until the pool calls
/// [`Outcomes::finish`].
pub trait WorkerPool: Send + Sync + 'static {
    /// Start executing an admitted unit.
    fn run(&self, unit: WorkUnit, outcomes: Outcomes);

    /// Reload the pool's configuration.
    fn reload(&self);
}

/// Sends a final payload to a callback URL.
///
/// Best-effort and fire-and-forget: the manager never observes the result.
pub trait ResultDelivery: Send + Sync + 'static {
    fn send(&self, url: String, payload: Value);
}
