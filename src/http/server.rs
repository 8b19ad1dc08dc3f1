//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the application's routes with the bridge middleware
//! - Wire up tower-http request tracing
//! - Serve until shutdown, then drain background log flushes

use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::client::Client;
use crate::config::validation::validate_config;
use crate::config::{BridgeConfig, ConfigError};
use crate::context::HeaderNames;
use crate::http::middleware::{api_context_middleware, BridgeState};
use crate::logs::LogFlusher;

/// Host server for an application that calls the API through the bridge.
pub struct HttpServer {
    router: Router,
    config: BridgeConfig,
    flusher: LogFlusher,
}

impl HttpServer {
    /// Wrap `app` with the bridge layers. `client` is also used for log flushes.
    pub fn new(config: BridgeConfig, client: Client, app: Router) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let headers = Arc::new(HeaderNames::from_config(&config.headers)?);
        let flusher = LogFlusher::new(client, &config.logs);

        let state = BridgeState {
            headers,
            flusher: flusher.clone(),
            request_timeout: config.listener.request_timeout(),
            max_message_bytes: config.logs.max_message_bytes,
        };

        let router = Self::build_router(app, state);
        Ok(Self {
            router,
            config,
            flusher,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Request timeouts are enforced inside the bridge middleware.
    fn build_router(app: Router, state: BridgeState) -> Router {
        app.layer(middleware::from_fn_with_state(state, api_context_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn flusher(&self) -> &LogFlusher {
        &self.flusher
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain pending flushes.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        let tracker = self.flusher.tracker();
        if tracker.drain(self.config.logs.drain_timeout()).await {
            tracing::info!(flushed = tracker.completed(), "HTTP server stopped");
        } else {
            tracing::warn!(in_flight = tracker.in_flight(), "HTTP server stopped with log flushes in flight");
        }
        Ok(())
    }
}
