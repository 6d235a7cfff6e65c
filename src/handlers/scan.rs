//! URL scan handler
//!
//! `POST /predict` extracts the lexical features of a URL and scores them
//! with the current classifier. A positive prediction feeds the sample back
//! into the dataset and may synchronously refit the model before the
//! response goes out, so a triggering request pays the training latency.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logic::features::extract;
use crate::{AppError, AppResult, AppState};

/// Wire label for a positive prediction. Misspelled on purpose: existing
/// consumers match on the literal "phising" and correcting it is a breaking
/// change.
pub const LABEL_PHISHING: &str = "phising";
pub const LABEL_SAFE: &str = "safe";

#[derive(Deserialize)]
pub struct PredictRequest {
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub features: Map<String, Value>,
    pub prediction: &'static str,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    let url = match req.url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => return Err(AppError::MissingUrl),
    };

    let features = extract(url)?;
    let label = state.model.predict(&features)?;

    if label == 1 {
        tracing::info!(%url, "positive prediction, feeding sample back");
        let mut pipeline = state.pipeline.lock().await;
        pipeline.record(&features, 1, &state.model)?;
    }

    Ok(Json(PredictResponse {
        features: features.to_json_map(),
        prediction: if label == 1 { LABEL_PHISHING } else { LABEL_SAFE },
    }))
}
