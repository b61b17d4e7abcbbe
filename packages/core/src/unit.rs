//! Work unit types tracked through admission and execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{JobDescriptor, JobId};

/// Lifecycle marker of a work unit.
///
/// Advisory only: which collection holds a unit decides what happens to it,
/// not this value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    Created,
    Queued,
    Running,
    Finished,
}

impl UnitStatus {
    /// Get a simple status string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Created => "created",
            UnitStatus::Queued => "queued",
            UnitStatus::Running => "running",
            UnitStatus::Finished => "finished",
        }
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job descriptor paired with its payload slot and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkUnit {
    descriptor: JobDescriptor,
    payload: Value,
    status: UnitStatus,
    created_at: DateTime<Utc>,
}

impl WorkUnit {
    /// Create a unit in the `Created` state.
    pub fn new(descriptor: JobDescriptor, payload: Value) -> Self {
        Self {
            descriptor,
            payload,
            status: UnitStatus::Created,
            created_at: Utc::now(),
        }
    }

    pub fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> JobId {
        self.descriptor.id()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Overwrite the payload with a cache or execution result.
    pub fn set_payload(&mut self, payload: Value) {
        self.payload = payload;
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Move the status forward. Returns `false` (and leaves the status
    /// untouched) when `next` is not later than the current status.
    pub fn advance(&mut self, next: UnitStatus) -> bool {
        if next <= self.status {
            return false;
        }
        self.status = next;
        true
    }

    /// Split into descriptor and payload, dropping the unit.
    pub fn into_parts(self) -> (JobDescriptor, Value) {
        (self.descriptor, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_is_monotonic() {
        let mut unit = WorkUnit::new(JobDescriptor::new("http://x"), json!({}));
        assert_eq!(unit.status(), UnitStatus::Created);

        assert!(unit.advance(UnitStatus::Queued));
        assert!(unit.advance(UnitStatus::Running));
        assert!(!unit.advance(UnitStatus::Queued));
        assert!(!unit.advance(UnitStatus::Running));
        assert_eq!(unit.status(), UnitStatus::Running);

        assert!(unit.advance(UnitStatus::Finished));
        assert!(!unit.advance(UnitStatus::Created));
    }

    #[test]
    fn created_may_skip_queued() {
        let mut unit = WorkUnit::new(JobDescriptor::new("http://x"), Value::Null);
        assert!(unit.advance(UnitStatus::Running));
        assert_eq!(unit.status().as_str(), "running");
    }

    #[test]
    fn payload_is_overwritten() {
        let descriptor = JobDescriptor::new("http://x");
        let id = descriptor.id();
        let mut unit = WorkUnit::new(descriptor, json!({"initial": true}));
        unit.set_payload(json!({"result": 42}));

        assert_eq!(unit.id(), id);
        let (descriptor, payload) = unit.into_parts();
        assert_eq!(descriptor.id(), id);
        assert_eq!(payload, json!({"result": 42}));
    }

    #[test]
    fn serialized_unit_carries_its_identity() {
        let descriptor = JobDescriptor::new("http://x");
        let id = descriptor.id();
        let unit = WorkUnit::new(descriptor, json!({"n": 1}));

        let value = serde_json::to_value(&unit).unwrap();
        assert_eq!(value["descriptor"]["id"], json!(id.to_string()));
        assert_eq!(value["status"], json!("created"));
        assert_eq!(value["payload"], json!({"n": 1}));
    }
}
