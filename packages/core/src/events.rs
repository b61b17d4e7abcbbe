//! Event types for observing the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobId;

/// Events emitted as jobs move through the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A creation event produced a new work unit.
    JobCreated {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// The cache answered the job; it will not run.
    CacheHit {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// The job got a slot and was handed to the worker pool.
    JobAdmitted {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// No slot was free; the job waits in arrival order.
    JobQueued {
        job_id: JobId,
        position: usize,
        timestamp: DateTime<Utc>,
    },
    /// A queued job was removed before it ran.
    JobCancelled {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// A payload was handed to result delivery.
    JobDelivered {
        job_id: JobId,
        url: String,
        timestamp: DateTime<Utc>,
    },
    /// The worker pool reported the definitive finish outcome.
    JobFinished {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// The worker pool reported a timeout.
    JobTimedOut {
        job_id: JobId,
        released: bool,
        timestamp: DateTime<Utc>,
    },
    /// The worker pool was asked to reload its configuration.
    PoolReloaded { timestamp: DateTime<Utc> },
    /// The concurrency limit changed.
    CapacityChanged {
        old: usize,
        new: usize,
        timestamp: DateTime<Utc>,
    },
}

impl DispatchEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DispatchEvent::JobCreated { timestamp, .. } => *timestamp,
            DispatchEvent::CacheHit { timestamp, .. } => *timestamp,
            DispatchEvent::JobAdmitted { timestamp, .. } => *timestamp,
            DispatchEvent::JobQueued { timestamp, .. } => *timestamp,
            DispatchEvent::JobCancelled { timestamp, .. } => *timestamp,
            DispatchEvent::JobDelivered { timestamp, .. } => *timestamp,
            DispatchEvent::JobFinished { timestamp, .. } => *timestamp,
            DispatchEvent::JobTimedOut { timestamp, .. } => *timestamp,
            DispatchEvent::PoolReloaded { timestamp } => *timestamp,
            DispatchEvent::CapacityChanged { timestamp, .. } => *timestamp,
        }
    }

    /// Get the job ID associated with this event, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            DispatchEvent::JobCreated { job_id, .. } => Some(*job_id),
            DispatchEvent::CacheHit { job_id, .. } => Some(*job_id),
            DispatchEvent::JobAdmitted { job_id, .. } => Some(*job_id),
            DispatchEvent::JobQueued { job_id, .. } => Some(*job_id),
            DispatchEvent::JobCancelled { job_id, .. } => Some(*job_id),
            DispatchEvent::JobDelivered { job_id, .. } => Some(*job_id),
            DispatchEvent::JobFinished { job_id, .. } => Some(*job_id),
            DispatchEvent::JobTimedOut { job_id, .. } => Some(*job_id),
            DispatchEvent::PoolReloaded { .. } | DispatchEvent::CapacityChanged { .. } => None,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            DispatchEvent::JobCreated { job_id, .. } => format!("Job {} created", job_id),
            DispatchEvent::CacheHit { job_id, .. } => format!("Job {} served from cache", job_id),
            DispatchEvent::JobAdmitted { job_id, .. } => format!("Job {} admitted", job_id),
            DispatchEvent::JobQueued {
                job_id, position, ..
            } => format!("Job {} queued at position {}", job_id, position),
            DispatchEvent::JobCancelled { job_id, .. } => format!("Job {} cancelled", job_id),
            DispatchEvent::JobDelivered { job_id, url, .. } => {
                format!("Job {} delivered to {}", job_id, url)
            }
            DispatchEvent::JobFinished { job_id, .. } => format!("Job {} finished", job_id),
            DispatchEvent::JobTimedOut {
                job_id, released, ..
            } => {
                let slot = if *released { "slot released" } else { "slot kept" };
                format!("Job {} timed out ({})", job_id, slot)
            }
            DispatchEvent::PoolReloaded { .. } => "Worker pool reloaded".to_string(),
            DispatchEvent::CapacityChanged { old, new, .. } => {
                format!("Capacity {} -> {}", old, new)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let job_id = JobId::new();
        let event = DispatchEvent::JobQueued {
            job_id,
            position: 2,
            timestamp: Utc::now(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "job_queued");
        assert_eq!(value["position"], 2);

        let back: DispatchEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back.job_id(), Some(job_id));
    }

    #[test]
    fn pool_events_have_no_job() {
        let event = DispatchEvent::PoolReloaded {
            timestamp: Utc::now(),
        };
        assert_eq!(event.job_id(), None);
        assert_eq!(event.description(), "Worker pool reloaded");
    }

    #[test]
    fn timeout_description_mentions_slot() {
        let event = DispatchEvent::JobTimedOut {
            job_id: JobId::new(),
            released: false,
            timestamp: Utc::now(),
        };
        assert!(event.description().ends_with("(slot kept)"));
    }
}
