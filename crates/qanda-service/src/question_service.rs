//! Question lifecycle: create, read, list, update, soft delete.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use qanda_core::{
    ensure_owner_or_admin, Actor, AnswerDescriptor, AnswerRepository, CoreError, CoreResult,
    MemberRepository, Page, PageRequest, QuestionDescriptor, QuestionId, QuestionRepository,
    SortKey, Visibility, DEFAULT_QUESTION_IMAGE,
};

use crate::storage::ImageStore;

/// An image uploaded alongside a question.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Patch for question fields. Absent fields are left as-is; omission never
/// nulls anything out.
#[derive(Debug, Clone, Default)]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
}

/// A question read together with its answer, if one exists.
#[derive(Debug, Clone)]
pub struct QuestionView {
    pub question: QuestionDescriptor,
    pub answer: Option<AnswerDescriptor>,
}

/// Business service for the question lifecycle.
pub struct QuestionService {
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
    members: Arc<dyn MemberRepository>,
    images: Arc<dyn ImageStore>,
}

impl QuestionService {
    /// Creates the service over its repositories and the image store.
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        answers: Arc<dyn AnswerRepository>,
        members: Arc<dyn MemberRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            questions,
            answers,
            members,
            images,
        }
    }

    /// Creates a question for the acting member. Image attachment is
    /// best-effort: a storage failure logs a warning and the question is
    /// created with the placeholder image instead.
    ///
    /// # Errors
    ///
    /// `NotFound` when the author is absent or has quit; `ValidationError`
    /// for empty title or content.
    pub async fn create(
        &self,
        actor: &Actor,
        title: &str,
        content: &str,
        visibility: Visibility,
        image: Option<ImageUpload>,
    ) -> CoreResult<QuestionDescriptor> {
        if title.trim().is_empty() {
            return Err(CoreError::validation("title must not be empty"));
        }
        if content.trim().is_empty() {
            return Err(CoreError::validation("content must not be empty"));
        }

        let author = self
            .members
            .get(actor.member_id)
            .await?
            .ok_or_else(|| CoreError::not_found("member", actor.member_id.to_string()))?;
        if !author.is_active() {
            return Err(CoreError::not_found("member", actor.member_id.to_string()));
        }

        let mut question = QuestionDescriptor::new(actor.member_id, title, content, visibility);

        if let Some(upload) = image {
            let stem = format!("{}_{}", actor.member_id, Utc::now().timestamp_millis());
            match self.images.store(&upload.bytes, &upload.file_name, &stem).await {
                Ok(stored_name) => question.image = stored_name,
                Err(e) => {
                    warn!(question_id = %question.question_id, error = %e,
                        "image upload failed; falling back to placeholder");
                    question.image = DEFAULT_QUESTION_IMAGE.to_string();
                }
            }
        }

        self.questions.create(&question).await?;
        debug!(question_id = %question.question_id, "created question");
        Ok(question)
    }

    /// Reads a question through the visibility gate and records the view.
    /// Secret questions the actor may not read are reported absent, not
    /// forbidden.
    ///
    /// # Errors
    ///
    /// `NotFound` when missing or hidden.
    pub async fn read(&self, question_id: QuestionId, actor: &Actor) -> CoreResult<QuestionView> {
        let question = self
            .questions
            .get_visible(question_id, actor.member_id, actor.is_admin())
            .await?
            .ok_or_else(|| CoreError::not_found("question", question_id.to_string()))?;

        self.questions.record_view(question_id).await?;

        let answer = self.answers.get_by_question(question_id).await?;
        Ok(QuestionView { question, answer })
    }

    /// Lists questions with secret titles masked for viewers who are neither
    /// the author nor an admin. Deleted and deactivated questions never
    /// appear.
    pub async fn list(
        &self,
        request: PageRequest,
        sort: SortKey,
        actor: &Actor,
    ) -> CoreResult<Page<QuestionDescriptor>> {
        let items = self
            .questions
            .list_page(sort, request.limit(), request.offset())
            .await?;
        let total = self.questions.count_listed().await?;

        let masked = items
            .into_iter()
            .map(|mut question| {
                let title = question
                    .display_title(actor.member_id, actor.is_admin())
                    .to_string();
                question.title = title;
                question
            })
            .collect();

        Ok(Page::new(masked, request, total))
    }

    /// Applies a partial update. Answered questions are immutable: once an
    /// admin has committed an answer, the question text must not shift
    /// under it.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless owner-or-admin; `InvalidState` when answered;
    /// `NotFound` when absent.
    pub async fn update(
        &self,
        question_id: QuestionId,
        actor: &Actor,
        patch: QuestionPatch,
    ) -> CoreResult<QuestionDescriptor> {
        let mut question = self
            .questions
            .get(question_id)
            .await?
            .ok_or_else(|| CoreError::not_found("question", question_id.to_string()))?;

        ensure_owner_or_admin(actor, question.author_id)?;

        if question.is_answered() {
            return Err(CoreError::invalid_state(
                "an answered question cannot be changed",
            ));
        }

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(CoreError::validation("title must not be empty"));
            }
            question.title = title;
        }
        if let Some(content) = patch.content {
            if content.trim().is_empty() {
                return Err(CoreError::validation("content must not be empty"));
            }
            question.content = content;
        }
        if let Some(visibility) = patch.visibility {
            question.visibility = visibility;
        }
        question.touch();

        self.questions.update(&question).await?;
        Ok(question)
    }

    /// Soft-deletes a question. Deleting twice is rejected so double-delete
    /// bugs surface at the caller.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless owner-or-admin; `NotFound` when absent or
    /// already deleted.
    pub async fn delete(&self, question_id: QuestionId, actor: &Actor) -> CoreResult<()> {
        let mut question = self
            .questions
            .get(question_id)
            .await?
            .ok_or_else(|| CoreError::not_found("question", question_id.to_string()))?;

        ensure_owner_or_admin(actor, question.author_id)?;

        if question.is_deleted() {
            return Err(CoreError::not_found("question", question_id.to_string()));
        }

        question.delete();
        self.questions.update(&question).await?;
        debug!(question_id = %question_id, "soft-deleted question");
        Ok(())
    }
}
