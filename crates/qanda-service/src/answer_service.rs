//! Answer lifecycle. Admin-only: members ask, operators answer.

use std::sync::Arc;

use tracing::debug;

use qanda_core::{
    ensure_admin, Actor, AnswerDescriptor, AnswerId, AnswerRepository, CoreError, CoreResult,
    QuestionId, QuestionRepository,
};

/// Business service for the answer lifecycle.
pub struct AnswerService {
    answers: Arc<dyn AnswerRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl AnswerService {
    /// Creates the service over its repositories.
    #[must_use]
    pub fn new(answers: Arc<dyn AnswerRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { answers, questions }
    }

    /// Creates the answer for a question. The answer's visibility snapshots
    /// the question's visibility at this instant; the question moves to
    /// answered in the same store transaction as the insert.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins; `NotFound` for a missing question;
    /// `AlreadyExists` when the question already has an answer;
    /// `ValidationError` for empty content.
    pub async fn create(
        &self,
        question_id: QuestionId,
        actor: &Actor,
        content: &str,
    ) -> CoreResult<AnswerDescriptor> {
        ensure_admin(actor)?;

        if content.trim().is_empty() {
            return Err(CoreError::validation("content must not be empty"));
        }

        let question = self
            .questions
            .get(question_id)
            .await?
            .ok_or_else(|| CoreError::not_found("question", question_id.to_string()))?;

        if question.answer_id.is_some() {
            return Err(CoreError::already_exists("answer", question_id.to_string()));
        }

        let answer =
            AnswerDescriptor::new(question_id, actor.member_id, content, question.visibility);
        self.answers.create(&answer).await?;
        debug!(answer_id = %answer.answer_id, question_id = %question_id, "created answer");
        Ok(answer)
    }

    /// Applies a content-only update to an answer.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins; `NotFound` when absent;
    /// `ValidationError` for empty content.
    pub async fn update(
        &self,
        answer_id: AnswerId,
        actor: &Actor,
        content: &str,
    ) -> CoreResult<AnswerDescriptor> {
        ensure_admin(actor)?;

        if content.trim().is_empty() {
            return Err(CoreError::validation("content must not be empty"));
        }

        let mut answer = self
            .answers
            .get(answer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("answer", answer_id.to_string()))?;

        answer.content = content.to_string();
        answer.touch();
        self.answers.update(&answer).await?;
        Ok(answer)
    }

    /// Deletes an answer. The parent question's back-reference is cleared in
    /// the same store transaction, but its status stays answered.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins; `NotFound` when absent.
    pub async fn delete(&self, answer_id: AnswerId, actor: &Actor) -> CoreResult<()> {
        ensure_admin(actor)?;

        self.answers.delete(answer_id).await?;
        debug!(answer_id = %answer_id, "deleted answer");
        Ok(())
    }
}
