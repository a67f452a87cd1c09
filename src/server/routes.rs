use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::instrument;

use super::AppState;
use crate::error::AppError;
use crate::history::{self, HistoryResponse};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[instrument(skip(state))]
pub async fn custody_history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    history::lookup(state.source.as_ref(), &state.extractor, &id)
        .await
        .map(Json)
}
