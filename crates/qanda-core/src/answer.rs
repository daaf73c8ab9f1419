//! Answer domain model. One answer per question, written by an admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ids::{AnswerId, MemberId, QuestionId};
use crate::question::Visibility;

/// Admin answer to a question. `question_id` is unique: the existence of a
/// row is the one-answer-per-question guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerDescriptor {
    pub answer_id: AnswerId,
    pub question_id: QuestionId,
    pub author_id: MemberId,
    pub content: String,
    pub visibility: AnswerVisibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Answer visibility, snapshotted from the parent question at creation.
/// A later visibility change on the question does not alter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerVisibility {
    Public,
    Secret,
}

impl AnswerDescriptor {
    /// Creates an answer mirroring the question's visibility at this instant.
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        author_id: MemberId,
        content: impl Into<String>,
        question_visibility: Visibility,
    ) -> Self {
        let now = Utc::now();
        Self {
            answer_id: AnswerId::new(),
            question_id,
            author_id,
            content: content.into(),
            visibility: AnswerVisibility::from(question_visibility),
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl From<Visibility> for AnswerVisibility {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::Public => AnswerVisibility::Public,
            Visibility::Secret => AnswerVisibility::Secret,
        }
    }
}

impl AnswerVisibility {
    /// Convert visibility to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerVisibility::Public => "public",
            AnswerVisibility::Secret => "secret",
        }
    }
}

impl FromStr for AnswerVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(AnswerVisibility::Public),
            "secret" => Ok(AnswerVisibility::Secret),
            _ => Err(format!("invalid answer visibility: {s}")),
        }
    }
}
