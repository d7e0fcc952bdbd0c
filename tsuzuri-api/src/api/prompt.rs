//! Practice sentence endpoint
//!
//! `GET /api/prompt?category=<string>` answers `{"text": ...}` where `text` is
//! either a JSON-encoded list of enriched sentences or the model's raw text.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::services::practice_set::{build_practice_set, resolve_category, PromptPayload};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub category: Option<String>,
}

/// GET /api/prompt
pub async fn get_prompt(
    State(state): State<AppState>,
    Query(query): Query<PromptQuery>,
) -> ApiResult<Json<PromptPayload>> {
    let category = resolve_category(query.category.as_deref(), &state.practice.default_category);

    let set = build_practice_set(state.generator.as_ref(), &state.generation, &category)
        .await
        .map_err(|e| {
            error!(category = %category, error = %e.0, "Practice set generation failed");
            ApiError::Upstream(e.0.to_string())
        })?;

    Ok(Json(set.into_payload()))
}

pub fn prompt_routes() -> Router<AppState> {
    Router::new().route("/prompt", get(get_prompt))
}
