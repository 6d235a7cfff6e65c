//! PhishGuard - URL phishing detection service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PHISHGUARD                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  API      │  │  Feature     │  │  Retrain Pipeline   │  │
//! │  │  (Axum)   │─▶│  Extractor   │─▶│  (append + refit)   │  │
//! │  └───────────┘  └──────┬───────┘  └──────────┬──────────┘  │
//! │                        ▼                     ▼              │
//! │                 ┌────────────┐       ┌────────────────┐    │
//! │                 │  Random    │◀──────│  CSV Dataset   │    │
//! │                 │  Forest    │       │  (append-only) │    │
//! │                 └────────────┘       └────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use config::Config;
use logic::dataset::DatasetStore;
use logic::model::{trainer, ModelHandle};
use logic::retrain::{FeedbackPipeline, RetrainPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("PhishGuard starting...");
    tracing::info!("Dataset: {}", config.dataset_path.display());
    tracing::info!("Model:   {}", config.model_path.display());

    let dataset = DatasetStore::new(config.dataset_path.clone());
    let model = bootstrap_model(&dataset, &config)?;

    let pipeline = FeedbackPipeline::new(
        dataset.clone(),
        RetrainPolicy::new(config.retrain_interval),
        config.model_path.clone(),
    );

    let state = AppState {
        model: Arc::new(model),
        pipeline: Arc::new(tokio::sync::Mutex::new(pipeline)),
        dataset,
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Load the serving model, or fit one from the seeded dataset when the
/// artifact does not exist yet.
fn bootstrap_model(dataset: &DatasetStore, config: &Config) -> anyhow::Result<ModelHandle> {
    if config.model_path.exists() {
        return ModelHandle::load(&config.model_path).with_context(|| {
            format!("failed to load model artifact {}", config.model_path.display())
        });
    }

    tracing::warn!(
        "model artifact {} missing, fitting from dataset",
        config.model_path.display()
    );
    let artifact = trainer::retrain(dataset, &config.model_path)
        .context("cannot bootstrap a model without a seeded dataset")?;
    Ok(ModelHandle::new(artifact))
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
    /// Append + maybe-retrain must be serialized; concurrent writers would
    /// lose rows in the rewrite-on-append dataset.
    pub pipeline: Arc<tokio::sync::Mutex<FeedbackPipeline>>,
    pub dataset: DatasetStore,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::scan::predict))
        .route("/update-dataset", post(handlers::feedback::update_dataset))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::Json;
    use crate::handlers::feedback::{update_dataset, FeedbackRequest};
    use crate::handlers::scan::{predict, PredictRequest, LABEL_PHISHING};
    use crate::logic::features::{extract, FEATURE_LAYOUT, LABEL_COLUMN};
    use std::fs;
    use tempfile::TempDir;

    const PHISH_URL: &str = "http://login-45.verify12.badsite3.ru/steal?acct=999";
    const SAFE_URL: &str = "http://example.com/home";

    /// Dataset seeded with several copies of each class so the forest
    /// reliably reproduces the training labels for those exact URLs.
    fn seed_state(dir: &TempDir) -> AppState {
        let csv = dir.path().join("dataset.csv");
        let mut columns = vec![LABEL_COLUMN.to_string()];
        columns.extend(FEATURE_LAYOUT.iter().map(|s| s.to_string()));
        let mut body = format!("{}\n", columns.join(","));
        for _ in 0..5 {
            for (url, label) in [(SAFE_URL, 0), (PHISH_URL, 1)] {
                let v = extract(url).unwrap();
                let mut fields = vec![label.to_string()];
                fields.extend(v.as_slice().iter().map(|x| x.to_string()));
                body.push_str(&fields.join(","));
                body.push('\n');
            }
        }
        fs::write(&csv, body).unwrap();

        let dataset = DatasetStore::new(csv);
        let model_path = dir.path().join("model.bin");
        let artifact = trainer::retrain(&dataset, &model_path).unwrap();
        let pipeline = FeedbackPipeline::new(dataset.clone(), RetrainPolicy::new(10), model_path);

        AppState {
            model: Arc::new(ModelHandle::new(artifact)),
            pipeline: Arc::new(tokio::sync::Mutex::new(pipeline)),
            dataset,
        }
    }

    #[tokio::test]
    async fn test_predict_missing_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let state = seed_state(&dir);

        let result = predict(State(state.clone()), Json(PredictRequest { url: None })).await;
        assert!(matches!(result, Err(AppError::MissingUrl)));

        let result = predict(
            State(state),
            Json(PredictRequest {
                url: Some(String::new()),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_positive_prediction_appends_one_labeled_row() {
        let dir = TempDir::new().unwrap();
        let state = seed_state(&dir);
        let before = state.dataset.load().unwrap().len();

        let Json(response) = predict(
            State(state.clone()),
            Json(PredictRequest {
                url: Some(PHISH_URL.to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.prediction, LABEL_PHISHING);
        assert_eq!(response.features.len(), FEATURE_LAYOUT.len());

        let dataset = state.dataset.load().unwrap();
        assert_eq!(dataset.len(), before + 1);
        assert_eq!(dataset.rows.last().unwrap()[0], 1.0);
    }

    #[tokio::test]
    async fn test_safe_prediction_does_not_touch_dataset() {
        let dir = TempDir::new().unwrap();
        let state = seed_state(&dir);
        let before = state.dataset.load().unwrap().len();

        let Json(response) = predict(
            State(state.clone()),
            Json(PredictRequest {
                url: Some(SAFE_URL.to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.prediction, "safe");
        assert_eq!(state.dataset.load().unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_feedback_bypasses_the_classifier() {
        let dir = TempDir::new().unwrap();
        let state = seed_state(&dir);
        let before = state.dataset.load().unwrap().len();

        // The classifier considers this URL safe; an explicit label=1 from
        // the verifier must still land in the dataset as phishing.
        let Json(response) = update_dataset(
            State(state.clone()),
            Json(FeedbackRequest {
                url: Some(SAFE_URL.to_string()),
                gemini_response: Some(1),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.message, "Dataset updated successfully");
        let dataset = state.dataset.load().unwrap();
        assert_eq!(dataset.len(), before + 1);
        assert_eq!(dataset.rows.last().unwrap()[0], 1.0);
    }

    #[tokio::test]
    async fn test_feedback_requires_both_fields() {
        let dir = TempDir::new().unwrap();
        let state = seed_state(&dir);

        let result = update_dataset(
            State(state.clone()),
            Json(FeedbackRequest {
                url: Some(SAFE_URL.to_string()),
                gemini_response: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::MissingFeedbackFields)));

        let result = update_dataset(
            State(state),
            Json(FeedbackRequest {
                url: None,
                gemini_response: Some(0),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::MissingFeedbackFields)));
    }
}
