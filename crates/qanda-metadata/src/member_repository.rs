//! SQLite implementation of the member repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{query, Row, SqlitePool};

use qanda_core::{
    CoreError, CoreResult, MemberDescriptor, MemberId, MemberRepository, MemberStatus, Role,
};

use crate::util::{format_timestamp, is_unique_violation, parse_timestamp};

/// SQLite-backed repository for member identities.
pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    /// Creates a new repository backed by the provided pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const MEMBER_COLUMNS: &str =
    "member_id, email, name, phone, password_hash, roles, status, created_at, updated_at";

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, member: &MemberDescriptor) -> CoreResult<()> {
        let roles = encode_roles(&member.roles);

        query(
            "INSERT INTO members (member_id, email, name, phone, password_hash, roles, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(member.member_id.to_bytes().to_vec())
        .bind(&member.email)
        .bind(&member.name)
        .bind(&member.phone)
        .bind(&member.password_hash)
        .bind(roles)
        .bind(member.status.as_str())
        .bind(format_timestamp(member.created_at))
        .bind(format_timestamp(member.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::already_exists("member", &member.email)
            } else {
                CoreError::internal(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn get(&self, member_id: MemberId) -> CoreResult<Option<MemberDescriptor>> {
        let row = query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = ?1"
        ))
        .bind(member_id.to_bytes().to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_member_row(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> CoreResult<Option<MemberDescriptor>> {
        let row = query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        row.map(|r| parse_member_row(&r)).transpose()
    }

    async fn update(&self, member: &MemberDescriptor) -> CoreResult<()> {
        let roles = encode_roles(&member.roles);

        let result = query(
            "UPDATE members
                SET email = ?2, name = ?3, phone = ?4, password_hash = ?5,
                    roles = ?6, status = ?7, updated_at = ?8
              WHERE member_id = ?1",
        )
        .bind(member.member_id.to_bytes().to_vec())
        .bind(&member.email)
        .bind(&member.name)
        .bind(&member.phone)
        .bind(&member.password_hash)
        .bind(roles)
        .bind(member.status.as_str())
        .bind(format_timestamp(member.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::already_exists("member", &member.email)
            } else {
                CoreError::internal(e.to_string())
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("member", member.member_id.to_string()));
        }
        Ok(())
    }

    async fn list(&self, limit: u32, offset: u32) -> CoreResult<Vec<MemberDescriptor>> {
        let rows = query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY member_id DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        rows.iter().map(parse_member_row).collect()
    }

    async fn count(&self) -> CoreResult<i64> {
        let row = query("SELECT COUNT(*) AS n FROM members")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok(row.get::<i64, _>("n"))
    }

    async fn quit(&self, member_id: MemberId) -> CoreResult<u64> {
        let member_bytes = member_id.to_bytes().to_vec();
        let now = format_timestamp(chrono::Utc::now());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        // Guarding on the current status makes re-quitting a no-row update,
        // which is rejected rather than absorbed.
        let quit = query(
            "UPDATE members SET status = 'quit', updated_at = ?2
              WHERE member_id = ?1 AND status = 'active'",
        )
        .bind(&member_bytes)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;

        if quit.rows_affected() == 0 {
            return Err(CoreError::not_found("member", member_id.to_string()));
        }

        let deactivated = query(
            "UPDATE questions SET status = 'deactivated', updated_at = ?2
              WHERE author_id = ?1 AND status != 'deleted'",
        )
        .bind(&member_bytes)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        Ok(deactivated)
    }
}

fn encode_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_roles(raw: &str) -> CoreResult<Vec<Role>> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| Role::from_str(s).map_err(CoreError::internal))
        .collect()
}

fn parse_member_row(row: &SqliteRow) -> CoreResult<MemberDescriptor> {
    let member_id_bytes: Vec<u8> = row.get("member_id");
    let member_id = MemberId::from_bytes(&member_id_bytes)
        .map_err(|e| CoreError::internal(format!("malformed member id: {e}")))?;

    let roles: String = row.get("roles");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(MemberDescriptor {
        member_id,
        email: row.get("email"),
        name: row.get("name"),
        phone: row.get("phone"),
        password_hash: row.get("password_hash"),
        roles: decode_roles(&roles)?,
        status: MemberStatus::from_str(&status).map_err(CoreError::internal)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
