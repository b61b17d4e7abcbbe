//! Worker pool handle implementing the dispatcher's pool contract.

use std::sync::Arc;
use std::time::Duration;

use dispatch::{Outcomes, WorkerPool};
use dispatch_core::WorkUnit;
use ractor::{Actor, ActorRef, MessagingErr};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::handler::JobHandler;
use crate::messages::{PoolError, PoolMessage, PoolStats};
use crate::pool_actor::{PoolActor, PoolArgs};

/// Configuration for the worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Execution timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
    /// Report finish right after the timeout outcome of a timed-out unit.
    ///
    /// Needed when the manager keeps slots on timeout, since this pool
    /// reports nothing else for a unit once it has timed out.
    pub finish_after_timeout: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300, // 5 minutes default
            finish_after_timeout: false,
        }
    }
}

impl PoolConfig {
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            ..Default::default()
        }
    }

    pub fn finish_after_timeout(mut self, finish: bool) -> Self {
        self.finish_after_timeout = finish;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Handle to a running [`PoolActor`].
///
/// A timed-out unit gets only the timeout outcome by default. Pair the pool
/// with `DispatchConfig::release_on_timeout`, or enable
/// `PoolConfig::finish_after_timeout`, so the unit's slot is released.
#[derive(Clone)]
pub struct ActorWorkerPool {
    actor: ActorRef<PoolMessage>,
}

impl ActorWorkerPool {
    /// Spawn the pool actor.
    pub async fn start<H: JobHandler>(
        handler: H,
        config: PoolConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), PoolError> {
        let args = PoolArgs {
            handler: Arc::new(handler),
            config,
        };
        let (actor, handle) = Actor::spawn(None, PoolActor, args).await?;
        Ok((Self { actor }, handle))
    }

    /// Query execution counters.
    pub async fn stats(&self) -> Result<PoolStats, PoolError> {
        let timeout = Duration::from_secs(5);
        let result = ractor::rpc::call(
            &self.actor,
            |reply| PoolMessage::GetStats { reply },
            Some(timeout),
        )
        .await
        .map_err(|e| PoolError::Actor(e.to_string()))?;

        match result {
            ractor::rpc::CallResult::Success(stats) => Ok(stats),
            ractor::rpc::CallResult::Timeout => Err(PoolError::Timeout),
            ractor::rpc::CallResult::SenderError => {
                Err(PoolError::Actor("Pool dropped the reply".into()))
            }
        }
    }

    /// Stop the pool. Units already executing still report their outcome.
    pub fn shutdown(&self) {
        let _ = self.actor.send_message(PoolMessage::Shutdown);
    }
}

impl WorkerPool for ActorWorkerPool {
    fn run(&self, unit: WorkUnit, outcomes: Outcomes) {
        let message = PoolMessage::Run {
            unit: Box::new(unit),
            outcomes,
        };

        // A unit the pool cannot accept still has to give its slot back.
        if let Err(MessagingErr::SendErr(PoolMessage::Run { unit, outcomes })) =
            self.actor.send_message(message)
        {
            let mut unit = *unit;
            tracing::error!(job_id = %unit.id(), "Worker pool is not running");
            unit.set_payload(json!({ "error": "worker pool unavailable" }));
            outcomes.finish(unit);
        }
    }

    fn reload(&self) {
        if let Err(e) = self.actor.send_message(PoolMessage::Reload) {
            tracing::warn!("Failed to reload worker pool: {}", e);
        }
    }
}

impl std::fmt::Debug for ActorWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorWorkerPool")
            .field("actor", &self.actor.get_id())
            .finish()
    }
}
