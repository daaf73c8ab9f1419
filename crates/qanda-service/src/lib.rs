//! Business services for the qanda board.
//! Shared by the REST API and by integration tests.

mod answer_service;
mod auth_service;
mod config;
mod like_service;
mod member_service;
mod question_service;
mod storage;
mod token;

pub use answer_service::AnswerService;
pub use auth_service::AuthService;
pub use config::{
    AuthConfig, Config, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig, StorageConfig,
};
pub use like_service::LikeService;
pub use member_service::{MemberPatch, MemberService};
pub use question_service::{ImageUpload, QuestionPatch, QuestionService, QuestionView};
pub use storage::{FileSystemImageStore, ImageStore};
pub use token::{TokenClaims, TokenKind, TokenPair, TokenService};
