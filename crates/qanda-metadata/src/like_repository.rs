//! SQLite implementation of the like ledger.
//!
//! The toggle is the only write path for `questions.like_count`. It runs as
//! one transaction whose first statement is a write, so concurrent toggles
//! serialize on the SQLite write lock: two toggles by the same member cannot
//! both observe the same like state, and counter updates cannot be lost.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{query, Row, SqlitePool};

use qanda_core::{
    CoreError, CoreResult, LikeDescriptor, LikeId, LikeRepository, MemberId, QuestionId,
    ToggleOutcome,
};

use crate::util::{format_timestamp, parse_timestamp};

/// SQLite-backed repository for like rows and the denormalized counter.
pub struct SqliteLikeRepository {
    pool: SqlitePool,
}

impl SqliteLikeRepository {
    /// Creates a new repository backed by the provided pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for SqliteLikeRepository {
    async fn toggle(
        &self,
        question_id: QuestionId,
        member_id: MemberId,
    ) -> CoreResult<ToggleOutcome> {
        let question_bytes = question_id.to_bytes().to_vec();
        let member_bytes = member_id.to_bytes().to_vec();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        // Leading with the DELETE acquires the write lock immediately,
        // before any state is observed.
        let removed = query("DELETE FROM likes WHERE question_id = ?1 AND member_id = ?2")
            .bind(&question_bytes)
            .bind(&member_bytes)
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?
            .rows_affected();

        let liked = if removed > 0 {
            // The guard keeps the CHECK constraint from ever firing; a row
            // existed, so a zero here means the counter and the ledger
            // disagree.
            let decremented = query(
                "UPDATE questions SET like_count = like_count - 1
                  WHERE question_id = ?1 AND like_count > 0",
            )
            .bind(&question_bytes)
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?
            .rows_affected();

            if decremented == 0 {
                return Err(CoreError::internal(format!(
                    "like counter for question {question_id} diverged from the ledger"
                )));
            }
            false
        } else {
            let like = LikeDescriptor::new(question_id, member_id);
            query(
                "INSERT INTO likes (like_id, question_id, member_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(like.like_id.to_bytes().to_vec())
            .bind(&question_bytes)
            .bind(&member_bytes)
            .bind(format_timestamp(like.created_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

            let incremented = query(
                "UPDATE questions SET like_count = like_count + 1 WHERE question_id = ?1",
            )
            .bind(&question_bytes)
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?
            .rows_affected();

            if incremented == 0 {
                return Err(CoreError::not_found("question", question_id.to_string()));
            }
            true
        };

        let like_count: i64 = query("SELECT like_count FROM questions WHERE question_id = ?1")
            .bind(&question_bytes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?
            .get("like_count");

        tx.commit()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        Ok(ToggleOutcome { liked, like_count })
    }

    async fn find(
        &self,
        question_id: QuestionId,
        member_id: MemberId,
    ) -> CoreResult<Option<LikeDescriptor>> {
        let row = query(
            "SELECT like_id, question_id, member_id, created_at
               FROM likes WHERE question_id = ?1 AND member_id = ?2",
        )
        .bind(question_id.to_bytes().to_vec())
        .bind(member_id.to_bytes().to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_like_row(&r)).transpose()
    }

    async fn count_for_question(&self, question_id: QuestionId) -> CoreResult<i64> {
        let row = query("SELECT COUNT(*) AS n FROM likes WHERE question_id = ?1")
            .bind(question_id.to_bytes().to_vec())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(row.get::<i64, _>("n"))
    }
}

fn parse_like_row(row: &SqliteRow) -> CoreResult<LikeDescriptor> {
    let like_id_bytes: Vec<u8> = row.get("like_id");
    let question_id_bytes: Vec<u8> = row.get("question_id");
    let member_id_bytes: Vec<u8> = row.get("member_id");
    let created_at: String = row.get("created_at");

    Ok(LikeDescriptor {
        like_id: LikeId::from_bytes(&like_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed like id: {e}")))?,
        question_id: QuestionId::from_bytes(&question_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed question id: {e}")))?,
        member_id: MemberId::from_bytes(&member_id_bytes)
            .map_err(|e| CoreError::internal(format!("malformed member id: {e}")))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
