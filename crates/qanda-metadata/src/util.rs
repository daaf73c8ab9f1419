use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::MIGRATOR;

/// Creates a SQLite connection pool configured for board workloads.
///
/// The busy timeout matters: like toggles and answer transactions serialize
/// on the SQLite write lock, so concurrent writers wait instead of failing.
pub async fn create_sqlite_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

/// Runs all outstanding migrations against the provided connection pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Transaction helper type alias.
#[allow(dead_code)]
pub type SqliteTransaction<'a> = sqlx::Transaction<'a, Sqlite>;

/// Whether a sqlx error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}

/// Whether a sqlx error is a FOREIGN KEY constraint violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.message().contains("FOREIGN KEY constraint failed"))
}

/// Renders a timestamp in the canonical column format. Millisecond RFC 3339
/// with a fixed offset sorts lexicographically, which the list queries rely
/// on.
pub(crate) fn format_timestamp(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Parses a timestamp column back into UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, qanda_core::CoreError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .map_err(|e| qanda_core::CoreError::internal(format!("malformed timestamp `{raw}`: {e}")))
}
