//! Job handler trait and progress reporting.

use std::future::Future;
use std::pin::Pin;

use dispatch::Outcomes;
use dispatch_core::WorkUnit;
use serde_json::Value;

/// Result type for job handlers.
pub type HandlerResult = Result<Value, String>;

/// Future type for async job handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Trait for job handlers.
///
/// Implement this trait to define how admitted units are executed. The
/// returned value becomes the unit's payload and is delivered on finish.
pub trait JobHandler: Send + Sync + 'static {
    /// Execute a unit.
    fn handle(&self, unit: &WorkUnit, progress: Progress) -> HandlerFuture;

    /// Reload handler configuration.
    fn reload(&self) {}
}

/// Publishes intermediate results of a running unit.
///
/// Each report is delivered to the unit's callback; the unit keeps running
/// and keeps its slot.
#[derive(Debug, Clone)]
pub struct Progress {
    unit: WorkUnit,
    outcomes: Outcomes,
}

impl Progress {
    pub(crate) fn new(unit: WorkUnit, outcomes: Outcomes) -> Self {
        Self { unit, outcomes }
    }

    /// Deliver an intermediate payload.
    pub fn report(&self, payload: Value) {
        let mut snapshot = self.unit.clone();
        snapshot.set_payload(payload);
        self.outcomes.success(&snapshot);
    }
}

/// A simple function-based job handler.
pub struct FnHandler<F>
where
    F: Fn(&WorkUnit, Progress) -> HandlerFuture + Send + Sync + 'static,
{
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&WorkUnit, Progress) -> HandlerFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> JobHandler for FnHandler<F>
where
    F: Fn(&WorkUnit, Progress) -> HandlerFuture + Send + Sync + 'static,
{
    fn handle(&self, unit: &WorkUnit, progress: Progress) -> HandlerFuture {
        (self.handler)(unit, progress)
    }
}

/// Helper macro for creating job handlers from async closures.
#[macro_export]
macro_rules! job_handler {
    (|$unit:ident, $progress:ident| $body:expr) => {
        $crate::FnHandler::new(
            |$unit: &$crate::WorkUnit, $progress: $crate::Progress| {
                let $unit = $unit.clone();
                Box::pin(async move {
                    let result: $crate::HandlerResult = $body;
                    result
                })
            },
        )
    };
}
