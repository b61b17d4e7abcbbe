//! Bounded admission queue.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use dispatch_core::{JobId, UnitStatus, WorkUnit};

/// Outcome of an admission attempt.
#[derive(Debug)]
pub enum Admission {
    /// A slot was granted; the caller now runs the unit.
    Admitted(WorkUnit),
    /// No slot was free; the queue holds the unit.
    Enqueued { position: usize },
}

/// Point-in-time view of the queue, taken under one lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub running: usize,
    pub queued: usize,
    pub capacity: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<WorkUnit>,
    running: usize,
    capacity: usize,
}

/// FIFO of units waiting for a concurrency slot.
///
/// The waiting units, the running counter and the capacity share one lock so
/// an admit-or-enqueue decision and its bookkeeping happen atomically. A
/// capacity of `0` turns admission control off: every unit is admitted and no
/// bookkeeping is done.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    state: Mutex<QueueState>,
}

impl AdmissionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                capacity,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the concurrency limit for subsequent admissions. Running units are
    /// never evicted and queued units are not admitted by this call.
    pub fn set_capacity(&self, capacity: usize) -> usize {
        std::mem::replace(&mut self.lock().capacity, capacity)
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Admit the unit if a slot is free, otherwise append it to the tail.
    pub fn try_admit_or_enqueue(&self, mut unit: WorkUnit) -> Admission {
        let mut state = self.lock();

        if state.capacity == 0 {
            return Admission::Admitted(unit);
        }

        if state.running < state.capacity {
            state.running += 1;
            return Admission::Admitted(unit);
        }

        unit.advance(UnitStatus::Queued);
        state.items.push_back(unit);
        Admission::Enqueued {
            position: state.items.len(),
        }
    }

    /// Give back one slot and take the oldest waiting unit, if any.
    ///
    /// The returned unit holds no slot; the caller submits it through
    /// [`AdmissionQueue::try_admit_or_enqueue`] again.
    pub fn release_and_pop_next(&self) -> Option<WorkUnit> {
        let mut state = self.lock();
        state.running = state.running.saturating_sub(1);
        state.items.pop_front()
    }

    /// Remove the first waiting unit with this identity. Units already handed
    /// to the worker pool are not affected.
    pub fn remove_by_identifier(&self, id: &JobId) -> Option<WorkUnit> {
        let mut state = self.lock();
        if state.capacity == 0 {
            return None;
        }

        let index = state.items.iter().position(|unit| unit.id() == *id)?;
        state.items.remove(index)
    }

    /// Whether a unit with this identity is waiting.
    pub fn contains(&self, id: &JobId) -> bool {
        self.lock().items.iter().any(|unit| unit.id() == *id)
    }

    /// Number of waiting (not running) units.
    pub fn size(&self) -> usize {
        self.lock().items.len()
    }

    pub fn running(&self) -> usize {
        self.lock().running
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.lock();
        QueueSnapshot {
            running: state.running,
            queued: state.items.len(),
            capacity: state.capacity,
        }
    }
}
