//! Pool actor that executes admitted units.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dispatch::Outcomes;
use dispatch_core::{JobId, WorkUnit};
use futures_util::FutureExt;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use serde_json::json;

use crate::handler::{JobHandler, Progress};
use crate::messages::{PoolMessage, PoolStats};
use crate::pool::PoolConfig;

/// State for the pool actor.
pub struct PoolActorState {
    /// Handler executing every unit.
    handler: Arc<dyn JobHandler>,
    /// Pool configuration.
    config: PoolConfig,
    /// Units currently executing, with their start time.
    in_flight: HashMap<JobId, DateTime<Utc>>,
    /// Lifetime counters.
    stats: PoolStats,
}

impl PoolActorState {
    pub fn new(handler: Arc<dyn JobHandler>, config: PoolConfig) -> Self {
        Self {
            handler,
            config,
            in_flight: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    fn snapshot(&self) -> PoolStats {
        PoolStats {
            in_flight: self.in_flight.len() as u64,
            ..self.stats.clone()
        }
    }
}

/// Pool actor arguments.
pub struct PoolArgs {
    pub handler: Arc<dyn JobHandler>,
    pub config: PoolConfig,
}

/// Actor that runs each admitted unit on its own task.
///
/// The pool does no admission control of its own; the dispatch manager only
/// hands it units that hold a slot.
pub struct PoolActor;

impl Actor for PoolActor {
    type Msg = PoolMessage;
    type State = PoolActorState;
    type Arguments = PoolArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(timeout_secs = args.config.timeout_secs, "Starting worker pool");
        Ok(PoolActorState::new(args.handler, args.config))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            PoolMessage::Run { unit, outcomes } => {
                let unit = *unit;
                let job_id = unit.id();
                state.in_flight.insert(job_id, Utc::now());

                tracing::debug!(job_id = %job_id, "Executing job");
                tokio::spawn(execute(
                    myself.clone(),
                    Arc::clone(&state.handler),
                    unit,
                    outcomes,
                    state.config.clone(),
                ));
            }

            PoolMessage::Completed { job_id, timed_out } => {
                if let Some(started_at) = state.in_flight.remove(&job_id) {
                    let duration_ms = (Utc::now() - started_at).num_milliseconds();
                    if timed_out {
                        state.stats.timed_out += 1;
                    } else {
                        state.stats.completed += 1;
                    }
                    tracing::debug!(job_id = %job_id, duration_ms, timed_out, "Execution ended");
                }
            }

            PoolMessage::Reload => {
                state.handler.reload();
                state.stats.reloads += 1;
                tracing::info!("Worker pool reloaded");
            }

            PoolMessage::GetStats { reply } => {
                let _ = reply.send(state.snapshot());
            }

            PoolMessage::Shutdown => {
                tracing::info!(in_flight = state.in_flight.len(), "Shutting down worker pool");
                myself.stop(None);
                return Ok(());
            }
        }

        Ok(())
    }
}

/// Run one handler future under the pool timeout and report its outcome.
///
/// The handler is invoked on this task, so a panic in either the call or the
/// returned future is reported as a handler error instead of losing the unit.
async fn execute(
    pool: ActorRef<PoolMessage>,
    handler: Arc<dyn JobHandler>,
    mut unit: WorkUnit,
    outcomes: Outcomes,
    config: PoolConfig,
) {
    let job_id = unit.id();
    let progress = Progress::new(unit.clone(), outcomes.clone());
    let input = unit.clone();
    let run = AssertUnwindSafe(async move { handler.handle(&input, progress).await })
        .catch_unwind()
        .map(|caught| {
            caught.unwrap_or_else(|panic| {
                let message = panic_message(&*panic);
                tracing::error!(job_id = %job_id, panic = message, "Job handler panicked");
                Err("handler panicked".to_string())
            })
        });

    let result = match config.timeout() {
        Some(limit) => tokio::time::timeout(limit, run).await.ok(),
        None => Some(run.await),
    };
    let timed_out = result.is_none();

    // Bookkeeping first: reporting finish may hand this pool the next unit.
    if pool
        .send_message(PoolMessage::Completed { job_id, timed_out })
        .is_err()
    {
        tracing::warn!(job_id = %job_id, "Worker pool stopped before completion was recorded");
    }

    match result {
        Some(Ok(payload)) => {
            unit.set_payload(payload);
            outcomes.finish(unit);
        }
        Some(Err(error)) => {
            tracing::warn!(job_id = %job_id, error = %error, "Job handler failed");
            unit.set_payload(json!({ "error": error }));
            outcomes.finish(unit);
        }
        None => {
            unit.set_payload(json!({ "error": "timeout" }));
            if config.finish_after_timeout {
                outcomes.timeout(unit.clone());
                outcomes.finish(unit);
            } else {
                outcomes.timeout(unit);
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
