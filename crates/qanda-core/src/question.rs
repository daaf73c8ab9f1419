//! Question domain model: status lifecycle, visibility, and list sorting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ids::{AnswerId, MemberId, QuestionId};

/// Stored image name used when a question has no attachment or the upload
/// could not be stored.
pub const DEFAULT_QUESTION_IMAGE: &str = "noImage.png";

/// Title shown to viewers who may not read a secret question's real title.
pub const SECRET_TITLE_PLACEHOLDER: &str = "[비밀글입니다]";

/// Question posted by a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDescriptor {
    pub question_id: QuestionId,
    pub author_id: MemberId,
    pub title: String,
    pub content: String,
    pub status: QuestionStatus,
    pub visibility: Visibility,
    /// Stored image name, `DEFAULT_QUESTION_IMAGE` when none was attached.
    pub image: String,
    pub view_count: i64,
    pub like_count: i64,
    /// Back-reference to the answer, if one exists. Id-valued only; the
    /// answer row is the owning side of the relation.
    pub answer_id: Option<AnswerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Question status lifecycle.
///
/// `Registered -> Answered` is one-way and triggered by answer creation.
/// Any non-deleted status may move to `Deleted` (soft delete). `Deactivated`
/// is cascaded from the author quitting and is independent of deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionStatus {
    Registered,
    Answered,
    Deleted,
    Deactivated,
}

/// Who may read a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Readable by any authenticated member.
    Public,
    /// Readable only by the author or an admin.
    Secret,
}

/// Sort order for question listings. Ties break by id descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    MostLikes,
    LeastLikes,
    MostViews,
    LeastViews,
}

impl QuestionDescriptor {
    /// Creates a newly registered question.
    #[must_use]
    pub fn new(
        author_id: MemberId,
        title: impl Into<String>,
        content: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        let now = Utc::now();
        Self {
            question_id: QuestionId::new(),
            author_id,
            title: title.into(),
            content: content.into(),
            status: QuestionStatus::Registered,
            visibility,
            image: DEFAULT_QUESTION_IMAGE.to_string(),
            view_count: 0,
            like_count: 0,
            answer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Records the answer back-reference and moves to `Answered`.
    pub fn attach_answer(&mut self, answer_id: AnswerId) {
        self.answer_id = Some(answer_id);
        self.status = QuestionStatus::Answered;
        self.touch();
    }

    /// Clears the answer back-reference. The status stays `Answered`; the
    /// question keeps its "has ever been answered" history.
    pub fn clear_answer(&mut self) {
        self.answer_id = None;
        self.touch();
    }

    /// Soft-deletes the question.
    pub fn delete(&mut self) {
        self.status = QuestionStatus::Deleted;
        self.touch();
    }

    /// Cascaded from the author quitting.
    pub fn deactivate(&mut self) {
        self.status = QuestionStatus::Deactivated;
        self.touch();
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.status == QuestionStatus::Answered
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status == QuestionStatus::Deleted
    }

    /// Whether the viewer may read this question at all.
    #[must_use]
    pub fn is_readable_by(&self, viewer: MemberId, viewer_is_admin: bool) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Secret => viewer == self.author_id || viewer_is_admin,
        }
    }

    /// Title to display in listings. Secret questions are masked with a fixed
    /// placeholder for viewers who are neither the author nor an admin.
    #[must_use]
    pub fn display_title(&self, viewer: MemberId, viewer_is_admin: bool) -> &str {
        if self.visibility == Visibility::Secret && !self.is_readable_by(viewer, viewer_is_admin) {
            SECRET_TITLE_PLACEHOLDER
        } else {
            &self.title
        }
    }
}

impl QuestionStatus {
    /// Convert status to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Registered => "registered",
            QuestionStatus::Answered => "answered",
            QuestionStatus::Deleted => "deleted",
            QuestionStatus::Deactivated => "deactivated",
        }
    }
}

impl FromStr for QuestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(QuestionStatus::Registered),
            "answered" => Ok(QuestionStatus::Answered),
            "deleted" => Ok(QuestionStatus::Deleted),
            "deactivated" => Ok(QuestionStatus::Deactivated),
            _ => Err(format!("invalid question status: {s}")),
        }
    }
}

impl Visibility {
    /// Convert visibility to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Secret => "secret",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "secret" => Ok(Visibility::Secret),
            _ => Err(format!("invalid visibility: {s}")),
        }
    }
}

impl SortKey {
    /// Convert sort key to its query-parameter form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostLikes => "most_likes",
            SortKey::LeastLikes => "least_likes",
            SortKey::MostViews => "most_views",
            SortKey::LeastViews => "least_views",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "most_likes" => Ok(SortKey::MostLikes),
            "least_likes" => Ok(SortKey::LeastLikes),
            "most_views" => Ok(SortKey::MostViews),
            "least_views" => Ok(SortKey::LeastViews),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(visibility: Visibility) -> QuestionDescriptor {
        QuestionDescriptor::new(MemberId::new(), "title", "content", visibility)
    }

    #[test]
    fn new_question_is_registered() {
        let q = question(Visibility::Public);
        assert_eq!(q.status, QuestionStatus::Registered);
        assert_eq!(q.image, DEFAULT_QUESTION_IMAGE);
        assert_eq!(q.like_count, 0);
    }

    #[test]
    fn attach_answer_moves_to_answered() {
        let mut q = question(Visibility::Public);
        q.attach_answer(AnswerId::new());
        assert!(q.is_answered());
        assert!(q.answer_id.is_some());
    }

    #[test]
    fn clear_answer_keeps_answered_status() {
        let mut q = question(Visibility::Public);
        q.attach_answer(AnswerId::new());
        q.clear_answer();
        assert!(q.answer_id.is_none());
        assert!(q.is_answered());
    }

    #[test]
    fn secret_question_readable_by_author_and_admin_only() {
        let q = question(Visibility::Secret);
        let stranger = MemberId::new();
        assert!(q.is_readable_by(q.author_id, false));
        assert!(q.is_readable_by(stranger, true));
        assert!(!q.is_readable_by(stranger, false));
    }

    #[test]
    fn secret_title_is_masked_for_strangers() {
        let q = question(Visibility::Secret);
        let stranger = MemberId::new();
        assert_eq!(q.display_title(stranger, false), SECRET_TITLE_PLACEHOLDER);
        assert_eq!(q.display_title(q.author_id, false), "title");
        assert_eq!(q.display_title(stranger, true), "title");
    }

    #[test]
    fn public_title_is_never_masked() {
        let q = question(Visibility::Public);
        assert_eq!(q.display_title(MemberId::new(), false), "title");
    }

    #[test]
    fn sort_key_round_trip() {
        for key in [
            SortKey::Newest,
            SortKey::Oldest,
            SortKey::MostLikes,
            SortKey::LeastLikes,
            SortKey::MostViews,
            SortKey::LeastViews,
        ] {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("hottest".parse::<SortKey>().is_err());
    }
}
