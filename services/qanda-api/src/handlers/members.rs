//! Member registration and profile endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use qanda_core::{ensure_admin, Actor, MemberDescriptor, MemberId, PageRequest};
use qanda_service::MemberPatch;

use crate::state::AppState;

use super::ApiError;

/// Register member request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Member profile response
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub member_id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub roles: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<MemberDescriptor> for MemberResponse {
    fn from(member: MemberDescriptor) -> Self {
        Self {
            member_id: member.member_id.to_string(),
            email: member.email,
            name: member.name,
            phone: member.phone,
            roles: member.roles.iter().map(|r| r.as_str().to_string()).collect(),
            status: member.status.as_str().to_string(),
            created_at: member.created_at,
        }
    }
}

/// Update member request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// List members query parameters
#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

/// List members response
#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberResponse>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

/// POST /qanda/members - Register a new member
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    debug!(email = %request.email, "registering member");
    let member = state
        .members
        .register(&request.email, &request.name, &request.phone, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// GET /qanda/members/:member_id - Fetch a member profile
pub async fn get_member(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(member_id): Path<MemberId>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = state.members.find(member_id, &actor).await?;
    Ok(Json(member.into()))
}

/// GET /qanda/members - List members (admin only)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    ensure_admin(&actor)?;
    let request = PageRequest::new(query.page, query.size)?;
    let page = state.members.list(request).await?;
    Ok(Json(ListMembersResponse {
        members: page.items.into_iter().map(Into::into).collect(),
        page: page.page,
        size: page.size,
        total: page.total,
    }))
}

/// PATCH /qanda/members/:member_id - Update a member profile
pub async fn patch_member(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(member_id): Path<MemberId>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = state
        .members
        .update(
            member_id,
            &actor,
            MemberPatch {
                name: request.name,
                phone: request.phone,
            },
        )
        .await?;
    Ok(Json(member.into()))
}

/// DELETE /qanda/members/:member_id - Quit a member
pub async fn delete_member(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(member_id): Path<MemberId>,
) -> Result<StatusCode, ApiError> {
    state.members.quit(member_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
