//! HTTP server: routes and shared state.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use rxscan_core::{Config, Extractor, SessionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use super::handlers;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<Extractor>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, extractor: Extractor) -> Self {
        let ttl = Duration::from_secs(config.server.session_ttl_secs);
        Self {
            config: Arc::new(config),
            extractor: Arc::new(extractor),
            sessions: SessionStore::new(ttl),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // Multipart framing adds a little on top of the file itself
    let body_limit = state
        .config
        .limits
        .max_file_size_bytes()
        .saturating_add(64 * 1024)
        .try_into()
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/image", get(handlers::image))
        .route("/extract", post(handlers::extract))
        .route("/download", get(handlers::download))
        .route("/clear", post(handlers::clear))
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    spawn_session_reaper(state.sessions.clone(), state.config.server.session_ttl_secs);

    let app = router(state);

    info!("rxscan listening on http://{}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically drop sessions that have been idle longer than the TTL.
fn spawn_session_reaper(sessions: SessionStore, ttl_secs: u64) {
    let period = Duration::from_secs(ttl_secs.clamp(1, 300));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged idle sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
