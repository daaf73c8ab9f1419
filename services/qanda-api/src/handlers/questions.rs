//! Question endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use qanda_core::{Actor, CoreError, PageRequest, QuestionDescriptor, QuestionId, SortKey, Visibility};
use qanda_service::{ImageUpload, QuestionPatch, QuestionView};

use crate::state::AppState;

use super::answers::AnswerResponse;
use super::ApiError;

/// Inline image payload, base64-encoded.
#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub file_name: String,
    pub data: String,
}

/// Create question request
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

/// Update question request
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

/// List questions query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuestionsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

fn default_sort() -> String {
    "newest".to_string()
}

/// Question response
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question_id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub status: String,
    pub visibility: String,
    pub image: String,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerResponse>,
}

impl From<QuestionDescriptor> for QuestionResponse {
    fn from(question: QuestionDescriptor) -> Self {
        Self {
            question_id: question.question_id.to_string(),
            author_id: question.author_id.to_string(),
            title: question.title,
            content: question.content,
            status: question.status.as_str().to_string(),
            visibility: question.visibility.as_str().to_string(),
            image: question.image,
            view_count: question.view_count,
            like_count: question.like_count,
            created_at: question.created_at,
            answer: None,
        }
    }
}

impl From<QuestionView> for QuestionResponse {
    fn from(view: QuestionView) -> Self {
        let mut response = QuestionResponse::from(view.question);
        response.answer = view.answer.map(Into::into);
        response
    }
}

/// List questions response
#[derive(Debug, Serialize)]
pub struct ListQuestionsResponse {
    pub questions: Vec<QuestionResponse>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

fn parse_visibility(raw: Option<&str>) -> Result<Visibility, CoreError> {
    match raw {
        None => Ok(Visibility::Public),
        Some(raw) => Visibility::from_str(raw).map_err(CoreError::validation),
    }
}

fn decode_image(payload: Option<ImagePayload>) -> Result<Option<ImageUpload>, CoreError> {
    payload
        .map(|image| {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(image.data.as_bytes())
                .map_err(|e| CoreError::validation(format!("image data is not valid base64: {e}")))?;
            Ok(ImageUpload {
                file_name: image.file_name,
                bytes,
            })
        })
        .transpose()
}

/// POST /qanda/questions - Create a question
pub async fn create_question(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    debug!(member_id = %actor.member_id, "creating question");
    let visibility = parse_visibility(request.visibility.as_deref())?;
    let image = decode_image(request.image)?;

    let question = state
        .questions
        .create(&actor, &request.title, &request.content, visibility, image)
        .await?;
    Ok((StatusCode::CREATED, Json(question.into())))
}

/// GET /qanda/questions/:question_id - Read a question with its answer
pub async fn get_question(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(question_id): Path<QuestionId>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let view = state.questions.read(question_id, &actor).await?;
    Ok(Json(view.into()))
}

/// GET /qanda/questions - List questions
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<Json<ListQuestionsResponse>, ApiError> {
    let request = PageRequest::new(query.page, query.size)?;
    let sort = SortKey::from_str(&query.sort).map_err(CoreError::validation)?;

    let page = state.questions.list(request, sort, &actor).await?;
    Ok(Json(ListQuestionsResponse {
        questions: page.items.into_iter().map(Into::into).collect(),
        page: page.page,
        size: page.size,
        total: page.total,
    }))
}

/// PATCH /qanda/questions/:question_id - Update a question
pub async fn patch_question(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(question_id): Path<QuestionId>,
    Json(request): Json<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let visibility = request
        .visibility
        .as_deref()
        .map(|raw| Visibility::from_str(raw).map_err(CoreError::validation))
        .transpose()?;

    let question = state
        .questions
        .update(
            question_id,
            &actor,
            QuestionPatch {
                title: request.title,
                content: request.content,
                visibility,
            },
        )
        .await?;
    Ok(Json(question.into()))
}

/// DELETE /qanda/questions/:question_id - Soft-delete a question
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(question_id): Path<QuestionId>,
) -> Result<StatusCode, ApiError> {
    state.questions.delete(question_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
