//! Login, refresh, and logout endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use qanda_core::Actor;

use crate::state::AppState;

use super::ApiError;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refreshed access token response
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /qanda/auth/login - Authenticate and issue a token pair
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer".to_string(),
    }))
}

/// POST /qanda/auth/refresh - Exchange a refresh token for an access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access_token = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}

/// POST /qanda/auth/logout - Advisory logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> StatusCode {
    state.auth.logout(&actor);
    StatusCode::OK
}
