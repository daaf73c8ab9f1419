//! Answer endpoints (admin only, enforced by the services).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use qanda_core::{Actor, AnswerDescriptor, AnswerId, QuestionId};

use crate::state::AppState;

use super::ApiError;

/// Create/update answer request
#[derive(Debug, Deserialize)]
pub struct AnswerContentRequest {
    pub content: String,
}

/// Answer response
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer_id: String,
    pub question_id: String,
    pub author_id: String,
    pub content: String,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
}

impl From<AnswerDescriptor> for AnswerResponse {
    fn from(answer: AnswerDescriptor) -> Self {
        Self {
            answer_id: answer.answer_id.to_string(),
            question_id: answer.question_id.to_string(),
            author_id: answer.author_id.to_string(),
            content: answer.content,
            visibility: answer.visibility.as_str().to_string(),
            created_at: answer.created_at,
        }
    }
}

/// POST /qanda/questions/:question_id/answers - Answer a question
pub async fn create_answer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(question_id): Path<QuestionId>,
    Json(request): Json<AnswerContentRequest>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    debug!(member_id = %actor.member_id, question_id = %question_id, "creating answer");
    let answer = state
        .answers
        .create(question_id, &actor, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(answer.into())))
}

/// PATCH /qanda/answers/:answer_id - Update an answer's content
pub async fn patch_answer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(answer_id): Path<AnswerId>,
    Json(request): Json<AnswerContentRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = state
        .answers
        .update(answer_id, &actor, &request.content)
        .await?;
    Ok(Json(answer.into()))
}

/// DELETE /qanda/answers/:answer_id - Delete an answer
pub async fn delete_answer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(answer_id): Path<AnswerId>,
) -> Result<StatusCode, ApiError> {
    state.answers.delete(answer_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
