#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dispatch::{DispatchConfig, DispatchManager, Hooks, Outcomes, ResultDelivery, WorkerPool};
use dispatch_core::{JobDescriptor, JobId, WorkUnit};
use serde_json::Value;

/// Worker pool that holds admitted units until the test reports an outcome.
#[derive(Default)]
pub struct RecordingPool {
    running: Mutex<Vec<(WorkUnit, Outcomes)>>,
    started: Mutex<Vec<JobId>>,
    reloads: AtomicUsize,
}

impl RecordingPool {
    pub fn started(&self) -> Vec<JobId> {
        self.started.lock().unwrap().clone()
    }

    pub fn running_ids(&self) -> Vec<JobId> {
        self.running
            .lock()
            .unwrap()
            .iter()
            .map(|(unit, _)| unit.id())
            .collect()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    fn take(&self, id: JobId) -> (WorkUnit, Outcomes) {
        let mut running = self.running.lock().unwrap();
        let index = running
            .iter()
            .position(|(unit, _)| unit.id() == id)
            .expect("unit is not running");
        running.remove(index)
    }

    /// Report the finish outcome with a result payload.
    pub fn finish(&self, id: JobId, result: Value) {
        let (mut unit, outcomes) = self.take(id);
        unit.set_payload(result);
        outcomes.finish(unit);
    }

    /// Report an intermediate result; the unit stays running.
    pub fn success(&self, id: JobId, result: Value) {
        let running = self.running.lock().unwrap();
        let (unit, outcomes) = running
            .iter()
            .find(|(unit, _)| unit.id() == id)
            .expect("unit is not running");
        let mut snapshot = unit.clone();
        snapshot.set_payload(result);
        let outcomes = outcomes.clone();
        drop(running);
        outcomes.success(&snapshot);
    }

    pub fn timeout(&self, id: JobId) {
        let (unit, outcomes) = self.take(id);
        outcomes.timeout(unit);
    }
}

impl WorkerPool for RecordingPool {
    fn run(&self, unit: WorkUnit, outcomes: Outcomes) {
        self.started.lock().unwrap().push(unit.id());
        self.running.lock().unwrap().push((unit, outcomes));
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

/// Delivery that records every (url, payload) pair.
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<(String, Value)>>,
}

impl RecordingDelivery {
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl ResultDelivery for RecordingDelivery {
    fn send(&self, url: String, payload: Value) {
        self.sent.lock().unwrap().push((url, payload));
    }
}

pub struct Harness {
    pub manager: DispatchManager,
    pub pool: Arc<RecordingPool>,
    pub delivery: Arc<RecordingDelivery>,
}

pub fn harness(config: DispatchConfig, hooks: Hooks) -> Harness {
    let pool = Arc::new(RecordingPool::default());
    let delivery = Arc::new(RecordingDelivery::default());
    let manager = DispatchManager::new(config, hooks, pool.clone(), delivery.clone());
    Harness {
        manager,
        pool,
        delivery,
    }
}

pub fn descriptor() -> JobDescriptor {
    JobDescriptor::new("http://hooks.local/done")
}
