#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api::{AppState, router};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use dispatch::{DispatchConfig, DispatchManager, Hooks, Outcomes, ResultDelivery, WorkerPool};
use dispatch_core::{DispatchStats, WorkUnit};
use serde_json::Value;
use tower::ServiceExt;

/// Worker pool that keeps admitted units running until released.
#[derive(Default)]
pub struct HoldingPool {
    running: Mutex<Vec<(WorkUnit, Outcomes)>>,
    reloads: AtomicUsize,
}

impl HoldingPool {
    pub fn running(&self) -> Vec<WorkUnit> {
        self.running
            .lock()
            .unwrap()
            .iter()
            .map(|(unit, _)| unit.clone())
            .collect()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl WorkerPool for HoldingPool {
    fn run(&self, unit: WorkUnit, outcomes: Outcomes) {
        self.running.lock().unwrap().push((unit, outcomes));
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct NullDelivery;

impl ResultDelivery for NullDelivery {
    fn send(&self, _url: String, _payload: Value) {}
}

pub struct TestApp {
    pub app: Router,
    pub manager: DispatchManager,
    pub pool: Arc<HoldingPool>,
}

/// Build the router over a dispatcher with the given capacity.
pub fn build_test_app(capacity: usize) -> TestApp {
    let pool = Arc::new(HoldingPool::default());
    let manager = DispatchManager::new(
        DispatchConfig::with_capacity(capacity),
        Hooks::new(|d| Value::Object(d.fields.clone())),
        pool.clone(),
        Arc::new(NullDelivery),
    );
    let state = AppState::new(manager.clone()).with_index("test index\n");
    TestApp {
        app: router(state),
        manager,
        pool,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Creation runs off the request path; wait for the stats to satisfy `done`.
pub async fn wait_for(manager: &DispatchManager, done: impl Fn(&DispatchStats) -> bool) {
    for _ in 0..200 {
        if done(&manager.stats()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached: {:?}", manager.stats());
}
