//! Like toggle endpoint.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use qanda_core::{Actor, QuestionId};

use crate::state::AppState;

use super::ApiError;

/// Toggle like response
#[derive(Debug, Serialize)]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// POST /qanda/questions/:question_id/like - Toggle the actor's like
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(question_id): Path<QuestionId>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
    let outcome = state.likes.toggle(question_id, &actor).await?;
    Ok(Json(ToggleLikeResponse {
        liked: outcome.liked,
        like_count: outcome.like_count,
    }))
}
