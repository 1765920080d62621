//! Server startup and shutdown logic

use anyhow::{Context, Result};
use axum::Router;
use loadgen_config::LoadgenConfig;
use loadgen_web::MetricsRegistry;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::app::{create_app, AppConfig, AppState, ENDPOINTS};

/// Server application struct
pub struct Server {
    config: LoadgenConfig,
    state: AppState,
}

impl Server {
    /// Create a new server instance with a fresh metrics registry
    pub fn new(config: LoadgenConfig) -> Result<Self> {
        let metrics = MetricsRegistry::new().context("Failed to create metrics registry")?;

        Ok(Self {
            config,
            state: AppState::new(Arc::new(metrics)),
        })
    }

    /// Shared application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        create_app(self.state.clone(), &AppConfig::from(&self.config.server))
    }

    /// Bind the configured address and serve until Ctrl-C or SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.socket_address();
        tracing::info!("Starting loadgen server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// In-flight requests get `server.shutdown_timeout` to finish once the
    /// signal fires; anything still running after that is dropped.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr().context("Listener has no local address")?;
        let app = self.build_app();
        let grace = self.config.server.shutdown_timeout;

        self.log_config_summary();
        tracing::info!("Server listening on {}", local_addr);

        let (signalled_tx, signalled_rx) = oneshot::channel();
        let shutdown = async move {
            shutdown.await;
            let _ = signalled_tx.send(());
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown);

        tokio::select! {
            result = server.into_future() => result.context("HTTP server error")?,
            _ = drain_deadline(signalled_rx, grace) => {
                tracing::warn!("In-flight requests still running after {:?}, shutting down anyway", grace);
            }
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        let server = &self.config.server;
        let enabled = |flag: bool| if flag { "Enabled" } else { "Disabled" };

        tracing::info!("=== Loadgen Server Configuration ===");
        tracing::info!("Bind Address: {}", server.socket_address());
        tracing::info!("CORS: {}", enabled(server.enable_cors));
        tracing::info!("Request ID: {}", enabled(server.enable_request_id));
        tracing::info!("Tracing: {}", enabled(server.enable_tracing));
        tracing::info!("Log Level: {} ({:?})", self.config.logging.level, self.config.logging.format);
        tracing::info!(
            "Runtime: {} worker threads, {} max blocking threads",
            self.config
                .runtime
                .worker_threads
                .map_or_else(|| "default".to_string(), |n| n.to_string()),
            self.config.runtime.max_blocking_threads
        );
        tracing::info!("Endpoints:");
        for endpoint in ENDPOINTS {
            tracing::info!("  {:<8} {:<10} {}", endpoint.path, endpoint.methods.join(","), endpoint.description);
        }
        tracing::info!("=====================================");
    }
}

/// Resolves `grace` after the shutdown signal fired; never resolves otherwise
async fn drain_deadline(signalled: oneshot::Receiver<()>, grace: Duration) {
    match signalled.await {
        Ok(()) => tokio::time::sleep(grace).await,
        Err(_) => std::future::pending().await,
    }
}

/// Graceful shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
