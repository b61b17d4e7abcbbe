//! Dispatch configuration.

use serde::{Deserialize, Serialize};

/// Configuration for admission and outcome handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum concurrently running units. `0` disables admission control.
    pub capacity: usize,
    /// Treat a timeout outcome as a finish outcome, releasing the unit's slot.
    ///
    /// When unset, a timed-out unit keeps its slot until the pool also
    /// reports finish.
    pub release_on_timeout: bool,
}

impl DispatchConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn release_on_timeout(mut self, release: bool) -> Self {
        self.release_on_timeout = release;
        self
    }
}
