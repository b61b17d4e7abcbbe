//! Dispatch manager: creation path, outcome handling and delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dispatch_core::{DispatchEvent, DispatchStats, JobDescriptor, JobId, UnitStatus, WorkUnit};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::DispatchConfig;
use crate::hooks::Hooks;
use crate::pool::{ResultDelivery, WorkerPool};
use crate::queue::{Admission, AdmissionQueue};

/// Lifetime counters, updated without touching the queue lock.
#[derive(Debug, Default)]
struct Counters {
    created: AtomicU64,
    cache_hits: AtomicU64,
    delivered: AtomicU64,
    finished: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct Inner {
    queue: AdmissionQueue,
    hooks: Hooks,
    pool: Arc<dyn WorkerPool>,
    delivery: Arc<dyn ResultDelivery>,
    release_on_timeout: bool,
    counters: Counters,
    event_tx: broadcast::Sender<DispatchEvent>,
}

/// Orchestrates jobs from creation to delivery.
///
/// Cloning is cheap; every clone drives the same queue.
#[derive(Clone)]
pub struct DispatchManager {
    inner: Arc<Inner>,
}

impl DispatchManager {
    pub fn new(
        config: DispatchConfig,
        hooks: Hooks,
        pool: Arc<dyn WorkerPool>,
        delivery: Arc<dyn ResultDelivery>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(Inner {
                queue: AdmissionQueue::new(config.capacity),
                hooks,
                pool,
                delivery,
                release_on_timeout: config.release_on_timeout,
                counters: Counters::default(),
                event_tx,
            }),
        }
    }

    /// Handle a creation event.
    pub fn on_create(&self, descriptor: JobDescriptor) {
        self.inner.create(descriptor);
    }

    /// Cancel a job that is still waiting for a slot. Returns whether a unit
    /// was removed; unknown or running jobs are ignored.
    pub fn on_remove(&self, id: &JobId) -> bool {
        let Some(unit) = self.inner.queue.remove_by_identifier(id) else {
            tracing::debug!(job_id = %id, "Remove ignored, job not queued");
            return false;
        };

        Counters::bump(&self.inner.counters.cancelled);
        tracing::info!(job_id = %unit.id(), "Queued job cancelled");
        self.inner.broadcast(DispatchEvent::JobCancelled {
            job_id: unit.id(),
            timestamp: Utc::now(),
        });
        true
    }

    /// Forward a reload request to the worker pool.
    pub fn on_reload(&self) {
        tracing::info!("Reloading worker pool");
        self.inner.pool.reload();
        self.inner.broadcast(DispatchEvent::PoolReloaded {
            timestamp: Utc::now(),
        });
    }

    /// Change the concurrency limit. Waiting units are only admitted as
    /// running units finish.
    pub fn set_capacity(&self, capacity: usize) {
        let old = self.inner.queue.set_capacity(capacity);
        tracing::info!(old, new = capacity, "Capacity changed");
        self.inner.broadcast(DispatchEvent::CapacityChanged {
            old,
            new: capacity,
            timestamp: Utc::now(),
        });
    }

    pub fn stats(&self) -> DispatchStats {
        let snapshot = self.inner.queue.snapshot();
        let counters = &self.inner.counters;
        DispatchStats {
            running: snapshot.running as u64,
            queued: snapshot.queued as u64,
            capacity: snapshot.capacity as u64,
            created: counters.created.load(Ordering::Relaxed),
            cache_hits: counters.cache_hits.load(Ordering::Relaxed),
            delivered: counters.delivered.load(Ordering::Relaxed),
            finished: counters.finished.load(Ordering::Relaxed),
            timed_out: counters.timed_out.load(Ordering::Relaxed),
            cancelled: counters.cancelled.load(Ordering::Relaxed),
        }
    }

    /// Subscribe to dispatch events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn is_queued(&self, id: &JobId) -> bool {
        self.inner.queue.contains(id)
    }
}

impl std::fmt::Debug for DispatchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchManager")
            .field("queue", &self.inner.queue.snapshot())
            .field("hooks", &self.inner.hooks)
            .field("release_on_timeout", &self.inner.release_on_timeout)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn broadcast(&self, event: DispatchEvent) {
        let _ = self.event_tx.send(event);
    }

    fn create(self: &Arc<Self>, descriptor: JobDescriptor) {
        let payload = self.hooks.build(&descriptor);
        let mut unit = WorkUnit::new(descriptor, payload);
        let job_id = unit.id();

        Counters::bump(&self.counters.created);
        tracing::debug!(job_id = %job_id, "Job created");
        self.broadcast(DispatchEvent::JobCreated {
            job_id,
            timestamp: Utc::now(),
        });

        match self.hooks.lookup(unit.descriptor()) {
            Some(cached) => {
                Counters::bump(&self.counters.cache_hits);
                tracing::debug!(job_id = %job_id, "Cache hit, skipping execution");
                self.broadcast(DispatchEvent::CacheHit {
                    job_id,
                    timestamp: Utc::now(),
                });

                unit.set_payload(cached);
                let (descriptor, payload) = unit.into_parts();
                self.send_response(&descriptor, payload);
            }
            None => self.submit(unit),
        }
    }

    fn submit(self: &Arc<Self>, unit: WorkUnit) {
        let job_id = unit.id();
        match self.queue.try_admit_or_enqueue(unit) {
            Admission::Admitted(unit) => self.start(unit),
            Admission::Enqueued { position } => {
                tracing::debug!(job_id = %job_id, position, "Job queued, no free slot");
                self.broadcast(DispatchEvent::JobQueued {
                    job_id,
                    position,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    /// Submit a unit taken off the queue. An empty queue is not an error.
    fn dispatch(self: &Arc<Self>, unit: Option<WorkUnit>) {
        if let Some(unit) = unit {
            self.submit(unit);
        }
    }

    fn start(self: &Arc<Self>, mut unit: WorkUnit) {
        unit.advance(UnitStatus::Running);
        let job_id = unit.id();

        tracing::debug!(job_id = %job_id, "Job admitted");
        self.broadcast(DispatchEvent::JobAdmitted {
            job_id,
            timestamp: Utc::now(),
        });

        self.pool.run(
            unit,
            Outcomes {
                inner: Arc::clone(self),
            },
        );
    }

    fn complete(self: &Arc<Self>, mut unit: WorkUnit) {
        unit.advance(UnitStatus::Finished);
        let job_id = unit.id();

        Counters::bump(&self.counters.finished);
        self.broadcast(DispatchEvent::JobFinished {
            job_id,
            timestamp: Utc::now(),
        });

        let (descriptor, payload) = unit.into_parts();
        self.hooks.finish(&descriptor, &payload);
        self.send_response(&descriptor, payload);

        let next = self.queue.release_and_pop_next();
        self.dispatch(next);
    }

    fn send_response(&self, descriptor: &JobDescriptor, payload: Value) {
        if !descriptor.has_callback() {
            tracing::warn!(job_id = %descriptor.id(), "No callback address, result dropped");
            return;
        }

        let url = descriptor.callback_url();
        let payload = self.hooks.transform(payload);

        Counters::bump(&self.counters.delivered);
        self.broadcast(DispatchEvent::JobDelivered {
            job_id: descriptor.id(),
            url: url.clone(),
            timestamp: Utc::now(),
        });
        self.delivery.send(url, payload);
    }
}

/// Outcome callbacks handed to the worker pool with each admitted unit.
///
/// Every outcome delivers the unit's current payload. Only
/// [`Outcomes::finish`] gives the slot back and admits the next waiting unit.
#[derive(Clone)]
pub struct Outcomes {
    inner: Arc<Inner>,
}

impl Outcomes {
    /// Definitive completion: runs the finish hook, delivers, then advances
    /// the queue.
    pub fn finish(&self, unit: WorkUnit) {
        tracing::debug!(job_id = %unit.id(), "Job finished");
        self.inner.complete(unit);
    }

    /// Intermediate result; the unit keeps its slot.
    pub fn success(&self, unit: &WorkUnit) {
        tracing::debug!(job_id = %unit.id(), "Job reported a result");
        self.inner
            .send_response(unit.descriptor(), unit.payload().clone());
    }

    /// The pool gave up waiting on the unit. The slot is kept unless the
    /// manager was configured with `release_on_timeout`.
    pub fn timeout(&self, unit: WorkUnit) {
        let job_id = unit.id();
        let released = self.inner.release_on_timeout;

        Counters::bump(&self.inner.counters.timed_out);
        tracing::warn!(job_id = %job_id, released, "Job timed out");
        self.inner.broadcast(DispatchEvent::JobTimedOut {
            job_id,
            released,
            timestamp: Utc::now(),
        });

        if released {
            self.inner.complete(unit);
        } else {
            let (descriptor, payload) = unit.into_parts();
            self.inner.send_response(&descriptor, payload);
        }
    }
}

impl std::fmt::Debug for Outcomes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outcomes").finish_non_exhaustive()
    }
}
