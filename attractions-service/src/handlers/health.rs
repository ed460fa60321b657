use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;
use serde_json::json;

/// Fixed greeting, independent of provider or log state.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Hello from the attractions service!" }))
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "attractions-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the model provider must be configured.
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state
        .recommender
        .provider()
        .health_check()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Model provider not ready");
            AppError::ServiceUnavailable
        })?;

    Ok(Json(json!({ "status": "ready" })))
}
