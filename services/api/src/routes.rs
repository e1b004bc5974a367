use crate::error::AppError;
use crate::infra::{AppState, DecisionEnvelope};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use gastric_decision::decisions::{CaseIntake, DecisionComposer, EligibilityResult};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn decision_router(composer: Arc<DecisionComposer>) -> Router {
    Router::new()
        .route("/api/v1/decisions", post(decision_endpoint))
        .route("/api/v1/eligibility", post(eligibility_endpoint))
        .with_state(composer)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Bodies are parsed here rather than through the `Json` extractor so that every malformed
/// case maps to 400 and every clinically incomplete one to 422.
fn parse_case(body: &Bytes) -> Result<CaseIntake, AppError> {
    Ok(serde_json::from_slice(body)?)
}

pub(crate) async fn decision_endpoint(
    State(composer): State<Arc<DecisionComposer>>,
    body: Bytes,
) -> Result<Json<DecisionEnvelope>, AppError> {
    let intake = parse_case(&body)?;
    let decision = composer.compose(intake)?;
    Ok(Json(DecisionEnvelope::new(decision)))
}

pub(crate) async fn eligibility_endpoint(
    State(composer): State<Arc<DecisionComposer>>,
    body: Bytes,
) -> Result<Json<EligibilityResult>, AppError> {
    let intake = parse_case(&body)?;
    Ok(Json(composer.evaluate_eligibility(intake)?))
}
