//! Like toggling over the atomic ledger.

use std::sync::Arc;

use tracing::debug;

use qanda_core::{
    Actor, CoreError, CoreResult, LikeRepository, QuestionId, QuestionRepository, ToggleOutcome,
};

/// Business service for the like ledger.
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl LikeService {
    /// Creates the service over its repositories.
    #[must_use]
    pub fn new(likes: Arc<dyn LikeRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { likes, questions }
    }

    /// Flips the actor's like on a question. The row change and the counter
    /// change commit together or not at all; the repository serializes
    /// concurrent toggles.
    ///
    /// # Errors
    ///
    /// `NotFound` when the question is absent.
    pub async fn toggle(&self, question_id: QuestionId, actor: &Actor) -> CoreResult<ToggleOutcome> {
        // Resolve first so a missing question reads as not-found rather than
        // a constraint failure out of the ledger.
        self.questions
            .get(question_id)
            .await?
            .ok_or_else(|| CoreError::not_found("question", question_id.to_string()))?;

        let outcome = self.likes.toggle(question_id, actor.member_id).await?;
        debug!(
            question_id = %question_id,
            member_id = %actor.member_id,
            liked = outcome.liked,
            like_count = outcome.like_count,
            "toggled like"
        );
        Ok(outcome)
    }
}
