//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_features: usize,
    dataset_rows: Option<usize>,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    // A missing dataset is an operator problem, not a reason to fail health.
    let dataset_rows = state.dataset.load().ok().map(|d| d.len());

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_features: state.model.feature_count(),
        dataset_rows,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
