//! Router assembly.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{answers, auth, health, likes, members, questions};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Builds the REST router. The auth middleware wraps every route and lets
/// the public endpoints (registration, login, refresh, liveness) through by
/// path.
pub fn build_router(state: AppState) -> Router {
    let tokens = state.tokens.clone();

    Router::new()
        .route("/health/live", get(health::live))
        .route("/qanda/auth/login", post(auth::login))
        .route("/qanda/auth/refresh", post(auth::refresh))
        .route("/qanda/auth/logout", post(auth::logout))
        .route(
            "/qanda/members",
            post(members::register).get(members::list_members),
        )
        .route(
            "/qanda/members/:member_id",
            get(members::get_member)
                .patch(members::patch_member)
                .delete(members::delete_member),
        )
        .route(
            "/qanda/questions",
            post(questions::create_question).get(questions::list_questions),
        )
        .route(
            "/qanda/questions/:question_id",
            get(questions::get_question)
                .patch(questions::patch_question)
                .delete(questions::delete_question),
        )
        .route(
            "/qanda/questions/:question_id/answers",
            post(answers::create_answer),
        )
        .route(
            "/qanda/answers/:answer_id",
            axum::routing::patch(answers::patch_answer).delete(answers::delete_answer),
        )
        .route("/qanda/questions/:question_id/like", post(likes::toggle_like))
        .layer(middleware::from_fn_with_state(tokens, auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
