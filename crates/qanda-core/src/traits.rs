use async_trait::async_trait;

use crate::answer::AnswerDescriptor;
use crate::error::CoreResult;
use crate::ids::{AnswerId, MemberId, QuestionId};
use crate::like::{LikeDescriptor, ToggleOutcome};
use crate::member::MemberDescriptor;
use crate::question::{QuestionDescriptor, SortKey};

/// Repository interface for member identities.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Persists a newly registered member.
    async fn create(&self, member: &MemberDescriptor) -> CoreResult<()>;

    /// Fetches a member by id.
    async fn get(&self, member_id: MemberId) -> CoreResult<Option<MemberDescriptor>>;

    /// Fetches a member by their unique email.
    async fn get_by_email(&self, email: &str) -> CoreResult<Option<MemberDescriptor>>;

    /// Updates an existing member descriptor.
    async fn update(&self, member: &MemberDescriptor) -> CoreResult<()>;

    /// Lists members ordered by id descending.
    async fn list(&self, limit: u32, offset: u32) -> CoreResult<Vec<MemberDescriptor>>;

    /// Returns the total number of members.
    async fn count(&self) -> CoreResult<i64>;

    /// Quits a member and deactivates every question they authored, in one
    /// transaction. Returns the number of questions deactivated. Fails with
    /// `NotFound` when the member is absent or has already quit; the
    /// transition happens exactly once.
    async fn quit(&self, member_id: MemberId) -> CoreResult<u64>;
}

/// Repository interface for questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persists a new question.
    async fn create(&self, question: &QuestionDescriptor) -> CoreResult<()>;

    /// Fetches a question by id with no visibility filter. For internal
    /// lifecycle checks; reads on behalf of a viewer go through
    /// `get_visible`.
    async fn get(&self, question_id: QuestionId) -> CoreResult<Option<QuestionDescriptor>>;

    /// Fetches a question the viewer is allowed to read: public questions,
    /// or secret questions when the viewer is the author or an admin.
    /// Returns `None` both when the row is absent and when it is hidden, so
    /// callers cannot distinguish the two.
    async fn get_visible(
        &self,
        question_id: QuestionId,
        viewer: MemberId,
        viewer_is_admin: bool,
    ) -> CoreResult<Option<QuestionDescriptor>>;

    /// Updates an existing question descriptor.
    async fn update(&self, question: &QuestionDescriptor) -> CoreResult<()>;

    /// Lists questions excluding deleted and deactivated ones, in the given
    /// sort order with id-descending tie-break.
    async fn list_page(
        &self,
        sort: SortKey,
        limit: u32,
        offset: u32,
    ) -> CoreResult<Vec<QuestionDescriptor>>;

    /// Counts the questions `list_page` would page over.
    async fn count_listed(&self) -> CoreResult<i64>;

    /// Increments the view counter.
    async fn record_view(&self, question_id: QuestionId) -> CoreResult<()>;
}

/// Repository interface for answers.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Persists a new answer and, in the same transaction, marks the parent
    /// question answered with the back-reference set. Fails with
    /// `AlreadyExists` when the question already has an answer.
    async fn create(&self, answer: &AnswerDescriptor) -> CoreResult<()>;

    /// Fetches an answer by id.
    async fn get(&self, answer_id: AnswerId) -> CoreResult<Option<AnswerDescriptor>>;

    /// Fetches the answer of a question, if any.
    async fn get_by_question(&self, question_id: QuestionId)
        -> CoreResult<Option<AnswerDescriptor>>;

    /// Updates an existing answer descriptor.
    async fn update(&self, answer: &AnswerDescriptor) -> CoreResult<()>;

    /// Deletes an answer and, in the same transaction, clears the parent
    /// question's back-reference. The question status is not reverted.
    async fn delete(&self, answer_id: AnswerId) -> CoreResult<()>;
}

/// Repository interface for the like ledger.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Atomically flips the (question, member) like state and adjusts the
    /// question's counter. Either both the row change and the counter change
    /// commit, or neither does.
    async fn toggle(&self, question_id: QuestionId, member_id: MemberId)
        -> CoreResult<ToggleOutcome>;

    /// Fetches the like row for a (question, member) pair, if present.
    async fn find(
        &self,
        question_id: QuestionId,
        member_id: MemberId,
    ) -> CoreResult<Option<LikeDescriptor>>;

    /// Counts like rows for a question straight from the ledger. Used by
    /// invariant checks, not by hot paths; those read the denormalized
    /// counter on the question row.
    async fn count_for_question(&self, question_id: QuestionId) -> CoreResult<i64>;
}
