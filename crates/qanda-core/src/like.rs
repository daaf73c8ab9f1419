//! Like relation between a member and a question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LikeId, MemberId, QuestionId};

/// A member's like on a question. At most one row exists per
/// (question, member) pair at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeDescriptor {
    pub like_id: LikeId,
    pub question_id: QuestionId,
    pub member_id: MemberId,
    pub created_at: DateTime<Utc>,
}

impl LikeDescriptor {
    /// Creates a new like row.
    #[must_use]
    pub fn new(question_id: QuestionId, member_id: MemberId) -> Self {
        Self {
            like_id: LikeId::new(),
            question_id,
            member_id,
            created_at: Utc::now(),
        }
    }
}

/// Result of an atomic like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Whether the member ends the operation in the "liked" state.
    pub liked: bool,
    /// The question's like count after the toggle committed.
    pub like_count: i64,
}
