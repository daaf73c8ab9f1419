//! Shared application state for the REST layer.

use std::sync::Arc;

use qanda_service::{
    AnswerService, AuthService, LikeService, MemberService, QuestionService, TokenService,
};

/// Handle to every business service, cloned into each handler.
#[derive(Clone)]
pub struct AppState {
    pub members: Arc<MemberService>,
    pub auth: Arc<AuthService>,
    pub questions: Arc<QuestionService>,
    pub answers: Arc<AnswerService>,
    pub likes: Arc<LikeService>,
    pub tokens: TokenService,
}

impl AppState {
    /// Bundles the services into one state value.
    #[must_use]
    pub fn new(
        members: Arc<MemberService>,
        auth: Arc<AuthService>,
        questions: Arc<QuestionService>,
        answers: Arc<AnswerService>,
        likes: Arc<LikeService>,
        tokens: TokenService,
    ) -> Self {
        Self {
            members,
            auth,
            questions,
            answers,
            likes,
            tokens,
        }
    }
}
