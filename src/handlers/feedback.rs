//! Dataset feedback handler
//!
//! `POST /update-dataset` lets an external verifier submit a ground-truth
//! label for a URL. The sample is appended regardless of what the classifier
//! would predict, then runs through the same retrain trigger as the scan
//! path.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::logic::features::extract;
use crate::{AppError, AppResult, AppState};

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub url: Option<String>,
    /// Verdict from the external oracle: 0 = benign, 1 = phishing.
    #[serde(rename = "geminiResponse")]
    pub gemini_response: Option<i32>,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub message: &'static str,
}

pub async fn update_dataset(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> AppResult<Json<FeedbackResponse>> {
    let (url, label) = match (req.url.as_deref(), req.gemini_response) {
        (Some(url), Some(label)) if !url.is_empty() => (url, label),
        _ => return Err(AppError::MissingFeedbackFields),
    };

    let features = extract(url)?;
    let mut pipeline = state.pipeline.lock().await;
    pipeline.record(&features, label, &state.model)?;

    Ok(Json(FeedbackResponse {
        message: "Dataset updated successfully",
    }))
}
