//! Route handlers.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use dispatch_core::{JobDescriptor, JobId};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};
use crate::response::{DataResponse, DebugResponse};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/create", post(create))
        .route("/remove/{id}", post(remove))
        .route("/reload", get(reload))
        .route("/debug", get(debug))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / -- index text.
async fn index(State(state): State<AppState>) -> String {
    state.index.to_string()
}

/// POST /create -- decode a descriptor and hand it to the dispatcher.
///
/// Always answers with a freshly generated identity. A body that is empty or
/// fails to decode produces no creation event.
async fn create(State(state): State<AppState>, body: Bytes) -> Json<DataResponse<JobDescriptor>> {
    let decoded = std::str::from_utf8(&body)
        .map_err(|e| e.to_string())
        .and_then(|text| JobDescriptor::from_json(text).map_err(|e| e.to_string()));

    let descriptor = match decoded {
        Ok(mut descriptor) => {
            descriptor.regenerate_id();
            tracing::debug!(job_id = %descriptor.id(), "Create request accepted");

            let manager = state.manager.clone();
            let event = descriptor.clone();
            tokio::task::spawn_blocking(move || manager.on_create(event));
            descriptor
        }
        Err(error) => {
            tracing::warn!(error = %error, "Create request ignored, body not decodable");
            JobDescriptor::new(String::new())
        }
    };

    Json(DataResponse::ok(descriptor))
}

/// POST /remove/{id} -- cancel a job that is still queued.
async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = JobId::parse(&id).map_err(|e| ApiError::BadRequest(format!("Invalid job ID: {e}")))?;
    let removed = state.manager.on_remove(&id);
    Ok(Json(json!({ "success": true, "removed": removed })))
}

/// GET /reload -- reload the worker pool.
async fn reload(State(state): State<AppState>) -> &'static str {
    state.manager.on_reload();
    "ok"
}

/// GET /debug -- dispatcher statistics.
async fn debug(State(state): State<AppState>) -> Json<DebugResponse> {
    Json(DebugResponse {
        stats: state.manager.stats(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}
