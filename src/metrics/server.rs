//! HTTP server for the Prometheus endpoint and a plain-text status probe.

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsServerConfig {
    /// Creates a config listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// Shared state behind the HTTP handlers.
pub struct MetricsState {
    registry: MetricsRegistry,
    last: MetricsSnapshot,
}

/// HTTP server exposing `/metrics`, `/status` and `/health`.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<RwLock<MetricsState>>,
}

impl MetricsServer {
    /// Creates a new metrics server.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                last: MetricsSnapshot::default(),
            })),
        }
    }

    /// Returns the shared state for updating metrics from the frame loop.
    pub fn state(&self) -> Arc<RwLock<MetricsState>> {
        Arc::clone(&self.state)
    }

    /// Serves until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/status", get(status_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

impl MetricsState {
    /// Applies a snapshot to the registry and keeps it for `/status`.
    pub fn update(&mut self, snapshot: &MetricsSnapshot) {
        self.registry.update(snapshot);
        self.last = snapshot.clone();
    }

    /// Same as [`update`](Self::update), for callers outside the runtime.
    pub fn update_blocking(state: &RwLock<Self>, snapshot: &MetricsSnapshot) {
        state.blocking_write().update(snapshot);
    }

    /// One-line status: verdict mark followed by the latest ratios.
    pub fn status_line(&self) -> String {
        let mark = self.last.verdict.map_or("-", |v| v.mark());
        format!(
            "{mark} red={:.4} green={:.4} ticks={}",
            self.last.red_ratio.unwrap_or(0.0),
            self.last.green_ratio.unwrap_or(0.0),
            self.last.counters.ticks,
        )
    }
}

async fn metrics_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> impl IntoResponse {
    let state = state.read().await;

    match state.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

async fn status_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> impl IntoResponse {
    (StatusCode::OK, state.read().await.status_line())
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Verdict;

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9090);
    }

    #[test]
    fn test_blocking_update_reaches_registry() {
        let server = MetricsServer::new(
            MetricsServerConfig::with_port(0),
            MetricsRegistry::new().unwrap(),
        );
        let state = server.state();
        let mut snapshot = MetricsSnapshot::default();
        snapshot.counters.auto_captures = 2;

        MetricsState::update_blocking(&state, &snapshot);

        let output = state.blocking_read().registry.encode().unwrap();
        assert!(output.contains("lamp_shutter_auto_captures_total 2"));
    }

    #[test]
    fn test_status_line() {
        let server = MetricsServer::new(
            MetricsServerConfig::default(),
            MetricsRegistry::new().unwrap(),
        );
        let state = server.state();
        assert!(state.blocking_read().status_line().starts_with("- "));

        let snapshot = MetricsSnapshot {
            verdict: Some(Verdict::NotOk),
            red_ratio: Some(0.25),
            ..MetricsSnapshot::default()
        };
        MetricsState::update_blocking(&state, &snapshot);

        assert_eq!(
            state.blocking_read().status_line(),
            "NG? red=0.2500 green=0.0000 ticks=0"
        );
    }
}
