#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actors::{ActorWorkerPool, JobHandler, PoolConfig};
use dispatch::{DispatchConfig, DispatchManager, Hooks, ResultDelivery};
use dispatch_core::JobDescriptor;
use serde_json::Value;
use tokio::sync::mpsc;

/// Delivery that forwards every (url, payload) pair to the test.
pub struct ChannelDelivery {
    tx: mpsc::UnboundedSender<(String, Value)>,
}

impl ResultDelivery for ChannelDelivery {
    fn send(&self, url: String, payload: Value) {
        let _ = self.tx.send((url, payload));
    }
}

pub struct Harness {
    pub manager: DispatchManager,
    pub pool: ActorWorkerPool,
    pub delivered: mpsc::UnboundedReceiver<(String, Value)>,
}

impl Harness {
    /// Wait for the next delivery.
    pub async fn next_delivery(&mut self) -> (String, Value) {
        tokio::time::timeout(Duration::from_secs(10), self.delivered.recv())
            .await
            .expect("timed out waiting for delivery")
            .expect("delivery channel closed")
    }

    /// Wait until the manager reports nothing running or queued.
    pub async fn drained(&self) {
        for _ in 0..200 {
            if self.manager.stats().active() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("dispatcher did not drain: {:?}", self.manager.stats());
    }
}

pub async fn harness<H: JobHandler>(
    handler: H,
    pool_config: PoolConfig,
    config: DispatchConfig,
    hooks: Hooks,
) -> Harness {
    let (pool, _handle) = ActorWorkerPool::start(handler, pool_config)
        .await
        .expect("pool should start");
    let (tx, delivered) = mpsc::unbounded_channel();
    let manager = DispatchManager::new(
        config,
        hooks,
        Arc::new(pool.clone()),
        Arc::new(ChannelDelivery { tx }),
    );
    Harness {
        manager,
        pool,
        delivered,
    }
}

pub fn descriptor() -> JobDescriptor {
    JobDescriptor::new("http://hooks.local/done")
}
