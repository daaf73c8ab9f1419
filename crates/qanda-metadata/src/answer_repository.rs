//! SQLite implementation of the answer repository.
//!
//! Answer creation and deletion touch two rows (the answer and the parent
//! question's back-reference), so both run inside a single transaction.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{query, Row, SqlitePool};

use qanda_core::{
    AnswerDescriptor, AnswerId, AnswerRepository, AnswerVisibility, CoreError, CoreResult,
    MemberId, QuestionId,
};

use crate::util::{format_timestamp, is_unique_violation, parse_timestamp};

/// SQLite-backed repository for answers.
pub struct SqliteAnswerRepository {
    pool: SqlitePool,
}

impl SqliteAnswerRepository {
    /// Creates a new repository backed by the provided pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const ANSWER_COLUMNS: &str =
    "answer_id, question_id, author_id, content, visibility, created_at, updated_at";

#[async_trait]
impl AnswerRepository for SqliteAnswerRepository {
    async fn create(&self, answer: &AnswerDescriptor) -> CoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        query(
            "INSERT INTO answers (answer_id, question_id, author_id, content, visibility, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(answer.answer_id.to_bytes().to_vec())
        .bind(answer.question_id.to_bytes().to_vec())
        .bind(answer.author_id.to_bytes().to_vec())
        .bind(&answer.content)
        .bind(answer.visibility.as_str())
        .bind(format_timestamp(answer.created_at))
        .bind(format_timestamp(answer.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::already_exists("answer", answer.question_id.to_string())
            } else {
                CoreError::internal(e.to_string())
            }
        })?;

        let result = query(
            "UPDATE questions SET status = 'answered', answer_id = ?2, updated_at = ?3
              WHERE question_id = ?1",
        )
        .bind(answer.question_id.to_bytes().to_vec())
        .bind(answer.answer_id.to_bytes().to_vec())
        .bind(format_timestamp(answer.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Rolls back the insert above.
            return Err(CoreError::not_found(
                "question",
                answer.question_id.to_string(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, answer_id: AnswerId) -> CoreResult<Option<AnswerDescriptor>> {
        let row = query(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE answer_id = ?1"
        ))
        .bind(answer_id.to_bytes().to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_answer_row(&r)).transpose()
    }

    async fn get_by_question(
        &self,
        question_id: QuestionId,
    ) -> CoreResult<Option<AnswerDescriptor>> {
        let row = query(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE question_id = ?1"
        ))
        .bind(question_id.to_bytes().to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_answer_row(&r)).transpose()
    }

    async fn update(&self, answer: &AnswerDescriptor) -> CoreResult<()> {
        let result = query(
            "UPDATE answers SET content = ?2, visibility = ?3, updated_at = ?4
              WHERE answer_id = ?1",
        )
        .bind(answer.answer_id.to_bytes().to_vec())
        .bind(&answer.content)
        .bind(answer.visibility.as_str())
        .bind(format_timestamp(answer.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("answer", answer.answer_id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, answer_id: AnswerId) -> CoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        // Clear the back-reference first; the question keeps its answered
        // status.
        query(
            "UPDATE questions SET answer_id = NULL, updated_at = ?2
              WHERE answer_id = ?1",
        )
        .bind(answer_id.to_bytes().to_vec())
        .bind(format_timestamp(chrono::Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        let result = query("DELETE FROM answers WHERE answer_id = ?1")
            .bind(answer_id.to_bytes().to_vec())
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("answer", answer_id.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(())
    }
}

fn parse_answer_row(row: &SqliteRow) -> CoreResult<AnswerDescriptor> {
    let answer_id_bytes: Vec<u8> = row.get("answer_id");
    let question_id_bytes: Vec<u8> = row.get("question_id");
    let author_id_bytes: Vec<u8> = row.get("author_id");

    let visibility: String = row.get("visibility");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(AnswerDescriptor {
        answer_id: AnswerId::from_bytes(&answer_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed answer id: {e}")))?,
        question_id: QuestionId::from_bytes(&question_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed question id: {e}")))?,
        author_id: MemberId::from_bytes(&author_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed author id: {e}")))?,
        content: row.get("content"),
        visibility: AnswerVisibility::from_str(&visibility).map_err(CoreError::internal)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member_repository::SqliteMemberRepository;
    use crate::question_repository::SqliteQuestionRepository;
    use crate::test_support::test_pool;
    use qanda_core::{
        MemberDescriptor, MemberRepository, QuestionDescriptor, QuestionRepository,
        QuestionStatus, Role, Visibility,
    };

    async fn seed(pool: &SqlitePool, visibility: Visibility) -> (MemberId, QuestionId) {
        let mut m = MemberDescriptor::new(
            "author@example.com",
            "tester",
            "010-1234-5678",
            vec![Role::User],
        );
        m.password_hash = "$argon2id$stub".to_string();
        SqliteMemberRepository::new(pool.clone())
            .create(&m)
            .await
            .unwrap();

        let q = QuestionDescriptor::new(m.member_id, "title", "content", visibility);
        SqliteQuestionRepository::new(pool.clone())
            .create(&q)
            .await
            .unwrap();
        (m.member_id, q.question_id)
    }

    #[tokio::test]
    async fn create_marks_question_answered_in_same_transaction() {
        let (pool, _dir) = test_pool().await;
        let (author, question_id) = seed(&pool, Visibility::Public).await;
        let answers = SqliteAnswerRepository::new(pool.clone());
        let questions = SqliteQuestionRepository::new(pool);

        let answer = AnswerDescriptor::new(question_id, author, "reply", Visibility::Public);
        answers.create(&answer).await.unwrap();

        let q = questions.get(question_id).await.unwrap().unwrap();
        assert_eq!(q.status, QuestionStatus::Answered);
        assert_eq!(q.answer_id, Some(answer.answer_id));
    }

    #[tokio::test]
    async fn second_answer_for_same_question_conflicts() {
        let (pool, _dir) = test_pool().await;
        let (author, question_id) = seed(&pool, Visibility::Public).await;
        let answers = SqliteAnswerRepository::new(pool);

        answers
            .create(&AnswerDescriptor::new(
                question_id,
                author,
                "first",
                Visibility::Public,
            ))
            .await
            .unwrap();

        let err = answers
            .create(&AnswerDescriptor::new(
                question_id,
                author,
                "second",
                Visibility::Public,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { entity: "answer", .. }));
    }

    #[tokio::test]
    async fn create_against_missing_question_rolls_back() {
        let (pool, _dir) = test_pool().await;
        let (author, _) = seed(&pool, Visibility::Public).await;
        let answers = SqliteAnswerRepository::new(pool);

        let orphan = AnswerDescriptor::new(QuestionId::new(), author, "reply", Visibility::Public);
        // Insert fails on the question foreign key before the status update.
        assert!(answers.create(&orphan).await.is_err());
        assert!(answers.get(orphan.answer_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_clears_back_reference_but_keeps_answered_status() {
        let (pool, _dir) = test_pool().await;
        let (author, question_id) = seed(&pool, Visibility::Public).await;
        let answers = SqliteAnswerRepository::new(pool.clone());
        let questions = SqliteQuestionRepository::new(pool);

        let answer = AnswerDescriptor::new(question_id, author, "reply", Visibility::Public);
        answers.create(&answer).await.unwrap();
        answers.delete(answer.answer_id).await.unwrap();

        assert!(answers.get(answer.answer_id).await.unwrap().is_none());
        let q = questions.get(question_id).await.unwrap().unwrap();
        assert_eq!(q.answer_id, None);
        assert_eq!(q.status, QuestionStatus::Answered);
    }

    #[tokio::test]
    async fn delete_of_absent_answer_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let answers = SqliteAnswerRepository::new(pool);
        assert!(matches!(
            answers.delete(AnswerId::new()).await.unwrap_err(),
            CoreError::NotFound { entity: "answer", .. }
        ));
    }

    #[tokio::test]
    async fn visibility_snapshot_survives_question_changes() {
        let (pool, _dir) = test_pool().await;
        let (author, question_id) = seed(&pool, Visibility::Secret).await;
        let answers = SqliteAnswerRepository::new(pool.clone());
        let questions = SqliteQuestionRepository::new(pool);

        let mut q = questions.get(question_id).await.unwrap().unwrap();
        let answer = AnswerDescriptor::new(question_id, author, "reply", q.visibility);
        answers.create(&answer).await.unwrap();

        // Flipping the question public later does not reopen the answer.
        q.visibility = Visibility::Public;
        q.touch();
        questions.update(&q).await.unwrap();

        let stored = answers.get(answer.answer_id).await.unwrap().unwrap();
        assert_eq!(stored.visibility, AnswerVisibility::Secret);
    }
}
