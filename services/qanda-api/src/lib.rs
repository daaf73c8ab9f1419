//! REST surface for the qanda board.

pub mod handlers;
pub mod middleware;
pub mod rest;
pub mod state;

pub use rest::build_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use qanda_core::{CoreError, CoreResult};
use qanda_metadata::{
    create_sqlite_pool, run_migrations, SqliteAnswerRepository, SqliteLikeRepository,
    SqliteMemberRepository, SqliteQuestionRepository,
};
use qanda_service::{
    AnswerService, AuthService, Config, FileSystemImageStore, LikeService, MemberService,
    QuestionService, TokenService,
};

/// Wires the full application state from configuration: pool, migrations,
/// repositories, services.
///
/// # Errors
///
/// Returns `Internal` when the database cannot be opened or migrated.
pub async fn build_state(config: &Config) -> CoreResult<AppState> {
    let pool = create_sqlite_pool(&config.database.url)
        .await
        .map_err(|e| CoreError::internal(format!("opening database: {e}")))?;
    run_migrations(&pool)
        .await
        .map_err(|e| CoreError::internal(format!("running migrations: {e}")))?;

    let members = Arc::new(SqliteMemberRepository::new(pool.clone()));
    let questions = Arc::new(SqliteQuestionRepository::new(pool.clone()));
    let answers = Arc::new(SqliteAnswerRepository::new(pool.clone()));
    let likes = Arc::new(SqliteLikeRepository::new(pool));
    let images = Arc::new(FileSystemImageStore::new(config.storage.image_dir.clone()));

    let tokens = TokenService::new(
        &config.auth.secret_key,
        config.auth.access_token_expiration_minutes,
        config.auth.refresh_token_expiration_minutes,
    );

    let member_service = Arc::new(MemberService::new(
        members.clone(),
        config.auth.admin_emails.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(members.clone(), tokens.clone()));
    let question_service = Arc::new(QuestionService::new(
        questions.clone(),
        answers.clone(),
        members,
        images,
    ));
    let answer_service = Arc::new(AnswerService::new(answers, questions.clone()));
    let like_service = Arc::new(LikeService::new(likes, questions));

    Ok(AppState::new(
        member_service,
        auth_service,
        question_service,
        answer_service,
        like_service,
        tokens,
    ))
}

/// Boots the REST server and serves until the listener fails.
///
/// # Errors
///
/// Returns `Internal` for bind or serve failures.
pub async fn run_server(config: Config) -> CoreResult<()> {
    let state = build_state(&config).await?;
    let router = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| CoreError::internal(format!("invalid listen address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CoreError::internal(format!("binding {addr}: {e}")))?;
    info!(%addr, "qanda REST API listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| CoreError::internal(format!("server terminated: {e}")))
}
