use crate::models::Attraction;
use crate::services::RecommendError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use validator::Validate;

/// Query string of `GET /testapi/`.
#[derive(Debug, Deserialize, Validate)]
pub struct AttractionQuery {
    #[validate(required(message = "key_project is required"))]
    pub key_project: Option<String>,

    #[validate(required(message = "prompt is required"))]
    pub prompt: Option<String>,
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidInput(message) => AppError::NotFound(anyhow::anyhow!(message)),
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

/// Recommend attractions for `key_project`, steered by `prompt`.
pub async fn get_attractions(
    State(state): State<AppState>,
    query: Result<Query<AttractionQuery>, QueryRejection>,
) -> Result<Json<Vec<Attraction>>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected unparsable query string");
        AppError::NotFound(anyhow::anyhow!(rejection.body_text()))
    })?;

    query
        .validate()
        .map_err(|e| AppError::NotFound(anyhow::anyhow!(e.to_string())))?;

    let location = query.key_project.unwrap_or_default();
    let prompt = query.prompt.unwrap_or_default();

    let attractions = state.recommender.recommend(&location, &prompt).await?;
    Ok(Json(attractions))
}
