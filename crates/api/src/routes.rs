use analysis::{AnalysisError, AnalysisRequest, AnalysisResult, Analyzer};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::metrics::{Metrics, MetricsSnapshot};

pub struct AppState {
    pub analyzer: Analyzer,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            metrics: Metrics::new(),
        }
    }
}

/// Every analysis failure is a 500 with `error` and, when the model did
/// answer, its `raw` reply.
pub struct ApiError(pub AnalysisError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({ "error": self.0.to_string() });
        if let Some(raw) = self.0.raw() {
            body["raw"] = Value::String(raw.to_string());
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze_emotion))
        .route("/stats", get(get_stats))
        // Reflections have no length cap
        .layer(DefaultBodyLimit::disable())
        // Mirrors origin, method and headers so credentials stay allowed
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(serde_json::json!({ "message": "Hello World" }))
}

async fn analyze_emotion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<Value>, ApiError> {
    let started = Instant::now();
    let outcome = state.analyzer.analyze(&req.text).await;

    state.metrics.record_analysis(
        started.elapsed(),
        outcome.as_ref().map(|_| ()).map_err(|e| e.kind()),
    );

    match outcome {
        Ok(value) => {
            match AnalysisResult::from_value(&value) {
                Some(result) => tracing::info!(
                    emotion = %result.emotion,
                    confidence = result.confidence,
                    "Analysis complete"
                ),
                None => tracing::info!("Analysis complete, reply has an unexpected shape"),
            }
            Ok(Json(value))
        }
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), error = %e, "Analysis failed");
            Err(ApiError(e))
        }
    }
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
