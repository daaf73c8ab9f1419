//! SQLite persistence adapters for the qanda board.

mod answer_repository;
mod like_repository;
mod member_repository;
pub mod password;
mod question_repository;
#[cfg(test)]
mod test_support;
mod util;

pub use answer_repository::SqliteAnswerRepository;
pub use like_repository::SqliteLikeRepository;
pub use member_repository::SqliteMemberRepository;
pub use question_repository::SqliteQuestionRepository;
pub use util::{create_sqlite_pool, run_migrations};

/// Embedded SQL migrations for the board database.
pub const MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
