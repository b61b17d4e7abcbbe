//! Bundled job handler and hooks.

use std::time::Duration;

use actors::{HandlerFuture, JobHandler, Progress};
use dispatch::Hooks;
use dispatch_core::WorkUnit;
use serde_json::{Value, json};

/// Echoes the unit's payload back as its result.
///
/// A numeric `sleep_ms` field delays the result and a string `fail` field
/// turns it into a handler error.
#[derive(Debug, Default)]
pub struct EchoHandler;

impl JobHandler for EchoHandler {
    fn handle(&self, unit: &WorkUnit, _progress: Progress) -> HandlerFuture {
        let payload = unit.payload().clone();
        Box::pin(async move {
            if let Some(ms) = payload.get("sleep_ms").and_then(Value::as_u64) {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            if let Some(reason) = payload.get("fail").and_then(Value::as_str) {
                return Err(reason.to_string());
            }
            Ok(json!({ "echo": payload }))
        })
    }

    fn reload(&self) {
        tracing::info!("Echo handler has nothing to reload");
    }
}

/// The payload starts as the descriptor's fields; finished jobs are logged.
pub fn hooks() -> Hooks {
    Hooks::new(|descriptor| Value::Object(descriptor.fields.clone())).on_finish(
        |descriptor, payload| {
            tracing::info!(job_id = %descriptor.id(), result = %payload, "Job finished");
        },
    )
}
