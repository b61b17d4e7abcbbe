use std::sync::Arc;

use chrono::{DateTime, Utc};
use dispatch::DispatchManager;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable; the manager and index text are shared.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dispatcher receiving create, remove and reload events.
    pub manager: DispatchManager,
    /// Text served at `/`.
    pub index: Arc<str>,
    /// Process start, reported as uptime by `/debug`.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(manager: DispatchManager) -> Self {
        Self {
            manager,
            index: Arc::from(concat!("dispatch ", env!("CARGO_PKG_VERSION"), "\n")),
            started_at: Utc::now(),
        }
    }

    pub fn with_index(mut self, index: impl Into<Arc<str>>) -> Self {
        self.index = index.into();
        self
    }
}
