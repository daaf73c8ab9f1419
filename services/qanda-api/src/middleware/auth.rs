//! Bearer-token authentication middleware.
//!
//! Verifies the access token on every request except the public endpoints,
//! and injects the resolved `Actor` into request extensions for handlers.
//! Expired and tampered tokens both come back as 401, but are logged apart
//! so telemetry can tell them apart.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use qanda_core::CoreError;
use qanda_service::{TokenKind, TokenService};

/// Endpoints reachable without a token: registration, login, refresh, and
/// the liveness probe.
fn is_public(method: &Method, path: &str) -> bool {
    (*method == Method::POST
        && matches!(
            path,
            "/qanda/members" | "/qanda/auth/login" | "/qanda/auth/refresh"
        ))
        || (*method == Method::GET && path == "/health/live")
}

/// Extracts the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => {
            warn!(path = %request.uri().path(), "missing bearer token");
            return (
                StatusCode::UNAUTHORIZED,
                "Missing bearer token. Provide via Authorization: Bearer <token>",
            )
                .into_response();
        }
    };

    let claims = match tokens.verify(&token, TokenKind::Access) {
        Ok(claims) => claims,
        Err(CoreError::ExpiredToken) => {
            warn!(path = %request.uri().path(), "rejected expired token");
            return (StatusCode::UNAUTHORIZED, "Token has expired").into_response();
        }
        Err(_) => {
            warn!(path = %request.uri().path(), "rejected token with invalid signature");
            return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
        }
    };

    let actor = match claims.to_actor() {
        Ok(actor) => actor,
        Err(_) => {
            warn!(path = %request.uri().path(), "token claims did not resolve to an actor");
            return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
        }
    };

    debug!(member_id = %actor.member_id, path = %request.uri().path(), "authenticated request");
    request.extensions_mut().insert(actor);
    next.run(request).await
}
