//! Shared helpers for repository tests.

use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::util::create_sqlite_pool;

/// Creates a migrated pool on a throwaway database file. The returned
/// directory guard must stay alive for the duration of the test.
pub(crate) async fn test_pool() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("qanda-test.db").display());
    let pool = create_sqlite_pool(&url).await.expect("create pool");
    crate::util::run_migrations(&pool).await.expect("run migrations");
    (pool, dir)
}
