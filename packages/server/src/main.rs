use std::sync::Arc;

use actors::ActorWorkerPool;
use anyhow::Context;
use api::AppState;
use delivery::WebhookDelivery;
use dispatch::DispatchManager;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod handler;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "server=info,dispatch=info,actors=info,delivery=info,api=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        capacity = config.dispatch.capacity,
        "Loaded server configuration"
    );

    // --- Worker pool ---
    let (pool, pool_handle) = ActorWorkerPool::start(handler::EchoHandler, config.pool.clone())
        .await
        .context("Failed to start worker pool")?;

    // --- Delivery ---
    let delivery =
        WebhookDelivery::new(&config.delivery).context("Failed to build callback client")?;

    // --- Dispatcher ---
    let manager = DispatchManager::new(
        config.dispatch.clone(),
        handler::hooks(),
        Arc::new(pool.clone()),
        Arc::new(delivery),
    );

    let mut events = manager.subscribe();
    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(event = %event.description(), "Dispatch event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // --- Server ---
    let app = api::router(AppState::new(manager));
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    pool.shutdown();
    let _ = pool_handle.await;
    event_log.abort();
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
