//! Response envelopes.

use dispatch_core::DispatchStats;
use serde::Serialize;

/// `{ "success": true, "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Body of `GET /debug`.
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    #[serde(flatten)]
    pub stats: DispatchStats,
    pub uptime_secs: i64,
}
