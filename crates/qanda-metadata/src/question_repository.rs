//! SQLite implementation of the question repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{query, Row, SqlitePool};

use qanda_core::{
    AnswerId, CoreError, CoreResult, MemberId, QuestionDescriptor, QuestionId, QuestionRepository,
    QuestionStatus, SortKey, Visibility,
};

use crate::util::{format_timestamp, is_foreign_key_violation, parse_timestamp};

/// SQLite-backed repository for questions.
pub struct SqliteQuestionRepository {
    pool: SqlitePool,
}

impl SqliteQuestionRepository {
    /// Creates a new repository backed by the provided pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const QUESTION_COLUMNS: &str = "question_id, author_id, title, content, status, visibility, \
     image, view_count, like_count, answer_id, created_at, updated_at";

/// ORDER BY clause for a sort key. Columns come from this fixed whitelist,
/// never from caller input; id descending breaks ties deterministically.
fn order_clause(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "created_at DESC, question_id DESC",
        SortKey::Oldest => "created_at ASC, question_id DESC",
        SortKey::MostLikes => "like_count DESC, question_id DESC",
        SortKey::LeastLikes => "like_count ASC, question_id DESC",
        SortKey::MostViews => "view_count DESC, question_id DESC",
        SortKey::LeastViews => "view_count ASC, question_id DESC",
    }
}

#[async_trait]
impl QuestionRepository for SqliteQuestionRepository {
    async fn create(&self, question: &QuestionDescriptor) -> CoreResult<()> {
        query(
            "INSERT INTO questions (question_id, author_id, title, content, status, visibility,
                                    image, view_count, like_count, answer_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(question.question_id.to_bytes().to_vec())
        .bind(question.author_id.to_bytes().to_vec())
        .bind(&question.title)
        .bind(&question.content)
        .bind(question.status.as_str())
        .bind(question.visibility.as_str())
        .bind(&question.image)
        .bind(question.view_count)
        .bind(question.like_count)
        .bind(question.answer_id.map(|id| id.to_bytes().to_vec()))
        .bind(format_timestamp(question.created_at))
        .bind(format_timestamp(question.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                CoreError::invalid_state(format!("member {} does not exist", question.author_id))
            } else {
                CoreError::internal(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn get(&self, question_id: QuestionId) -> CoreResult<Option<QuestionDescriptor>> {
        let row = query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE question_id = ?1"
        ))
        .bind(question_id.to_bytes().to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_question_row(&r)).transpose()
    }

    async fn get_visible(
        &self,
        question_id: QuestionId,
        viewer: MemberId,
        viewer_is_admin: bool,
    ) -> CoreResult<Option<QuestionDescriptor>> {
        // Hidden and absent rows are indistinguishable to the caller.
        let row = query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
              WHERE question_id = ?1
                AND (visibility = 'public'
                     OR (visibility = 'secret' AND (author_id = ?2 OR ?3 = 1)))"
        ))
        .bind(question_id.to_bytes().to_vec())
        .bind(viewer.to_bytes().to_vec())
        .bind(viewer_is_admin)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_question_row(&r)).transpose()
    }

    async fn update(&self, question: &QuestionDescriptor) -> CoreResult<()> {
        // The view and like counters are deliberately absent: they have their
        // own write paths (`record_view`, the like toggle) and writing a
        // stale descriptor here must not roll them back.
        let result = query(
            "UPDATE questions
                SET title = ?2, content = ?3, status = ?4, visibility = ?5,
                    image = ?6, answer_id = ?7, updated_at = ?8
              WHERE question_id = ?1",
        )
        .bind(question.question_id.to_bytes().to_vec())
        .bind(&question.title)
        .bind(&question.content)
        .bind(question.status.as_str())
        .bind(question.visibility.as_str())
        .bind(&question.image)
        .bind(question.answer_id.map(|id| id.to_bytes().to_vec()))
        .bind(format_timestamp(question.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(
                "question",
                question.question_id.to_string(),
            ));
        }
        Ok(())
    }

    async fn list_page(
        &self,
        sort: SortKey,
        limit: u32,
        offset: u32,
    ) -> CoreResult<Vec<QuestionDescriptor>> {
        let rows = query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
              WHERE status NOT IN ('deleted', 'deactivated')
              ORDER BY {}
              LIMIT ?1 OFFSET ?2",
            order_clause(sort)
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        rows.iter().map(parse_question_row).collect()
    }

    async fn count_listed(&self) -> CoreResult<i64> {
        let row =
            query("SELECT COUNT(*) AS n FROM questions WHERE status NOT IN ('deleted', 'deactivated')")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(row.get::<i64, _>("n"))
    }

    async fn record_view(&self, question_id: QuestionId) -> CoreResult<()> {
        query("UPDATE questions SET view_count = view_count + 1 WHERE question_id = ?1")
            .bind(question_id.to_bytes().to_vec())
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(())
    }
}

pub(crate) fn parse_question_row(row: &SqliteRow) -> CoreResult<QuestionDescriptor> {
    let question_id_bytes: Vec<u8> = row.get("question_id");
    let author_id_bytes: Vec<u8> = row.get("author_id");
    let answer_id_bytes: Option<Vec<u8>> = row.get("answer_id");

    let status: String = row.get("status");
    let visibility: String = row.get("visibility");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(QuestionDescriptor {
        question_id: QuestionId::from_bytes(&question_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed question id: {e}")))?,
        author_id: MemberId::from_bytes(&author_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed author id: {e}")))?,
        title: row.get("title"),
        content: row.get("content"),
        status: QuestionStatus::from_str(&status).map_err(CoreError::internal)?,
        visibility: Visibility::from_str(&visibility).map_err(CoreError::internal)?,
        image: row.get("image"),
        view_count: row.get("view_count"),
        like_count: row.get("like_count"),
        answer_id: answer_id_bytes
            .map(|bytes| {
                AnswerId::from_bytes(&bytes)
                    .map_err(|e| CoreError::internal(format!("malformed answer id: {e}")))
            })
            .transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member_repository::SqliteMemberRepository;
    use crate::test_support::test_pool;
    use qanda_core::{MemberDescriptor, MemberRepository, Role};

    async fn seeded_member(pool: &SqlitePool, email: &str) -> MemberId {
        let mut m = MemberDescriptor::new(email, "tester", "010-1234-5678", vec![Role::User]);
        m.password_hash = "$argon2id$stub".to_string();
        SqliteMemberRepository::new(pool.clone())
            .create(&m)
            .await
            .unwrap();
        m.member_id
    }

    fn question(author: MemberId, title: &str, visibility: Visibility) -> QuestionDescriptor {
        QuestionDescriptor::new(author, title, "content", visibility)
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (pool, _dir) = test_pool().await;
        let author = seeded_member(&pool, "author@example.com").await;
        let repo = SqliteQuestionRepository::new(pool);

        let q = question(author, "first", Visibility::Public);
        repo.create(&q).await.unwrap();

        let found = repo.get(q.question_id).await.unwrap().expect("question exists");
        assert_eq!(found.title, "first");
        assert_eq!(found.status, QuestionStatus::Registered);
        assert!(found.answer_id.is_none());
    }

    #[tokio::test]
    async fn create_with_unknown_author_fails() {
        let (pool, _dir) = test_pool().await;
        let repo = SqliteQuestionRepository::new(pool);

        let q = question(MemberId::new(), "orphan", Visibility::Public);
        assert!(matches!(
            repo.create(&q).await.unwrap_err(),
            CoreError::InvalidState { .. }
        ));
    }

    #[tokio::test]
    async fn secret_question_is_visible_to_author_and_admin_only() {
        let (pool, _dir) = test_pool().await;
        let author = seeded_member(&pool, "author@example.com").await;
        let repo = SqliteQuestionRepository::new(pool);

        let q = question(author, "secret", Visibility::Secret);
        repo.create(&q).await.unwrap();

        let stranger = MemberId::new();
        assert!(repo.get_visible(q.question_id, author, false).await.unwrap().is_some());
        assert!(repo.get_visible(q.question_id, stranger, true).await.unwrap().is_some());
        assert!(repo.get_visible(q.question_id, stranger, false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn public_question_is_visible_to_anyone() {
        let (pool, _dir) = test_pool().await;
        let author = seeded_member(&pool, "author@example.com").await;
        let repo = SqliteQuestionRepository::new(pool);

        let q = question(author, "public", Visibility::Public);
        repo.create(&q).await.unwrap();

        assert!(repo
            .get_visible(q.question_id, MemberId::new(), false)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn list_excludes_deleted_and_deactivated() {
        let (pool, _dir) = test_pool().await;
        let author = seeded_member(&pool, "author@example.com").await;
        let repo = SqliteQuestionRepository::new(pool);

        let keep = question(author, "keep", Visibility::Public);
        let mut gone = question(author, "gone", Visibility::Public);
        let mut idle = question(author, "idle", Visibility::Public);
        repo.create(&keep).await.unwrap();
        repo.create(&gone).await.unwrap();
        repo.create(&idle).await.unwrap();

        gone.delete();
        repo.update(&gone).await.unwrap();
        idle.deactivate();
        repo.update(&idle).await.unwrap();

        let listed = repo.list_page(SortKey::Newest, 10, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "keep");
        assert_eq!(repo.count_listed().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sort_by_likes_with_id_tie_break() {
        let (pool, _dir) = test_pool().await;
        let author = seeded_member(&pool, "author@example.com").await;
        let repo = SqliteQuestionRepository::new(pool);

        let mut popular = question(author, "popular", Visibility::Public);
        popular.like_count = 5;
        let early_tie = question(author, "early-tie", Visibility::Public);
        let late_tie = question(author, "late-tie", Visibility::Public);
        repo.create(&popular).await.unwrap();
        repo.create(&early_tie).await.unwrap();
        repo.create(&late_tie).await.unwrap();

        let listed = repo.list_page(SortKey::MostLikes, 10, 0).await.unwrap();
        assert_eq!(listed[0].title, "popular");
        // Equal like counts fall back to id descending: latest insert first.
        assert_eq!(listed[1].title, "late-tie");
        assert_eq!(listed[2].title, "early-tie");
    }

    #[tokio::test]
    async fn record_view_increments_counter() {
        let (pool, _dir) = test_pool().await;
        let author = seeded_member(&pool, "author@example.com").await;
        let repo = SqliteQuestionRepository::new(pool);

        let q = question(author, "viewed", Visibility::Public);
        repo.create(&q).await.unwrap();

        repo.record_view(q.question_id).await.unwrap();
        repo.record_view(q.question_id).await.unwrap();

        let found = repo.get(q.question_id).await.unwrap().unwrap();
        assert_eq!(found.view_count, 2);
    }
}
