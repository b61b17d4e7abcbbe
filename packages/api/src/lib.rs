//! HTTP request surface for the callback job dispatcher.
//!
//! Exposes the dispatch manager over a small axum router:
//! - `GET /` index text
//! - `POST /create` job creation
//! - `POST /remove/{id}` cancellation of a queued job
//! - `GET /reload` worker pool reload
//! - `GET /debug` dispatcher statistics

mod error;
mod response;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use response::{DataResponse, DebugResponse};
pub use routes::router;
pub use state::AppState;
