pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::parser::Extractor;
use crate::settings::Settings;
use crate::source::{HttpSource, Source};

/// Per-process handles shared by every request. Nothing here is mutable.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn Source>,
    pub extractor: Arc<Extractor>,
}

impl AppState {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            extractor: Arc::new(Extractor::default()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(routes::health_handler))
        .route("/custody-history/:id", get(routes::custody_history_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: &Settings, addr: &str) -> Result<()> {
    let source = HttpSource::new(settings).context("Failed to create upstream client")?;
    let app = build_router(AppState::new(Arc::new(source)));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(addr, upstream = %settings.upstream_url, timeout_secs = settings.timeout_secs, "listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
