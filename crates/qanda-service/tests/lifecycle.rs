//! End-to-end walks through the board's lifecycle rules, running the real
//! services over a throwaway SQLite database.

use std::sync::Arc;

use tempfile::TempDir;

use qanda_core::{
    Actor, CoreError, MemberDescriptor, PageRequest, SortKey, Visibility,
    SECRET_TITLE_PLACEHOLDER,
};
use qanda_metadata::{
    create_sqlite_pool, run_migrations, SqliteAnswerRepository, SqliteLikeRepository,
    SqliteMemberRepository, SqliteQuestionRepository,
};
use qanda_service::{
    AnswerService, AuthService, FileSystemImageStore, ImageUpload, LikeService, MemberPatch,
    MemberService, QuestionPatch, QuestionService, TokenKind, TokenService,
};

const ADMIN_EMAIL: &str = "admin@example.com";

struct Stack {
    members: MemberService,
    auth: AuthService,
    questions: QuestionService,
    answers: AnswerService,
    likes: LikeService,
    tokens: TokenService,
    _dir: TempDir,
}

async fn stack() -> Stack {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("qanda-test.db").display());
    let pool = create_sqlite_pool(&url).await.expect("create pool");
    run_migrations(&pool).await.expect("run migrations");

    let members = Arc::new(SqliteMemberRepository::new(pool.clone()));
    let questions = Arc::new(SqliteQuestionRepository::new(pool.clone()));
    let answers = Arc::new(SqliteAnswerRepository::new(pool.clone()));
    let likes = Arc::new(SqliteLikeRepository::new(pool));
    let images = Arc::new(FileSystemImageStore::new(dir.path().join("images")));
    let tokens = TokenService::new("lifecycle-test-secret", 30, 420);

    Stack {
        members: MemberService::new(members.clone(), vec![ADMIN_EMAIL.to_string()]),
        auth: AuthService::new(members.clone(), tokens.clone()),
        questions: QuestionService::new(
            questions.clone(),
            answers.clone(),
            members.clone(),
            images,
        ),
        answers: AnswerService::new(answers, questions.clone()),
        likes: LikeService::new(likes, questions),
        tokens,
        _dir: dir,
    }
}

fn actor_of(member: &MemberDescriptor) -> Actor {
    Actor::new(member.member_id, member.email.clone(), member.roles.clone())
}

async fn register_user(stack: &Stack, email: &str) -> MemberDescriptor {
    stack
        .members
        .register(email, "tester", "010-1234-5678", "password123")
        .await
        .expect("register member")
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_leaves_store_unchanged() {
    let stack = stack().await;
    register_user(&stack, "dup@example.com").await;

    let err = stack
        .members
        .register("dup@example.com", "other", "010-0000-0000", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { entity: "member", .. }));

    let page = stack
        .members
        .list(PageRequest::new(1, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn allowlisted_email_registers_as_admin() {
    let stack = stack().await;
    let admin = register_user(&stack, ADMIN_EMAIL).await;
    assert!(admin.is_admin());

    let plain = register_user(&stack, "user@example.com").await;
    assert!(!plain.is_admin());
}

#[tokio::test]
async fn answered_question_walk() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let admin = register_user(&stack, ADMIN_EMAIL).await;
    let author_actor = actor_of(&author);
    let admin_actor = actor_of(&admin);

    let question = stack
        .questions
        .create(&author_actor, "how do lifetimes work", "please explain", Visibility::Public, None)
        .await
        .unwrap();

    let answer = stack
        .answers
        .create(question.question_id, &admin_actor, "they are regions")
        .await
        .unwrap();

    // The author can see their answered question.
    let view = stack
        .questions
        .read(question.question_id, &author_actor)
        .await
        .unwrap();
    assert!(view.question.is_answered());
    assert_eq!(view.answer.as_ref().map(|a| a.answer_id), Some(answer.answer_id));

    // Answered questions are immutable, even for the author.
    let err = stack
        .questions
        .update(
            question.question_id,
            &author_actor,
            QuestionPatch {
                title: Some("new title".to_string()),
                ..QuestionPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState { .. }));

    // Deleting the answer clears the reference but not the status.
    stack
        .answers
        .delete(answer.answer_id, &admin_actor)
        .await
        .unwrap();
    let view = stack
        .questions
        .read(question.question_id, &author_actor)
        .await
        .unwrap();
    assert!(view.answer.is_none());
    assert!(view.question.is_answered());
}

#[tokio::test]
async fn second_answer_is_rejected() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let admin = register_user(&stack, ADMIN_EMAIL).await;

    let question = stack
        .questions
        .create(&actor_of(&author), "q", "c", Visibility::Public, None)
        .await
        .unwrap();

    stack
        .answers
        .create(question.question_id, &actor_of(&admin), "first")
        .await
        .unwrap();
    let err = stack
        .answers
        .create(question.question_id, &actor_of(&admin), "second")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists { entity: "answer", .. }));
}

#[tokio::test]
async fn non_admin_cannot_answer() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let question = stack
        .questions
        .create(&actor_of(&author), "q", "c", Visibility::Public, None)
        .await
        .unwrap();

    let err = stack
        .answers
        .create(question.question_id, &actor_of(&author), "self-answer")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));
}

#[tokio::test]
async fn secret_question_reads_as_absent_for_strangers() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let stranger = register_user(&stack, "stranger@example.com").await;

    let question = stack
        .questions
        .create(&actor_of(&author), "my secret", "contents", Visibility::Secret, None)
        .await
        .unwrap();

    // Not-found, never unauthorized: existence must not leak.
    let err = stack
        .questions
        .read(question.question_id, &actor_of(&stranger))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "question", .. }));

    // The author still reads it fine.
    assert!(stack
        .questions
        .read(question.question_id, &actor_of(&author))
        .await
        .is_ok());
}

#[tokio::test]
async fn listing_masks_secret_titles_for_strangers_only() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let stranger = register_user(&stack, "stranger@example.com").await;
    let admin = register_user(&stack, ADMIN_EMAIL).await;

    stack
        .questions
        .create(&actor_of(&author), "visible title", "c", Visibility::Secret, None)
        .await
        .unwrap();

    let request = PageRequest::new(1, 10).unwrap();
    let for_stranger = stack
        .questions
        .list(request, SortKey::Newest, &actor_of(&stranger))
        .await
        .unwrap();
    assert_eq!(for_stranger.items[0].title, SECRET_TITLE_PLACEHOLDER);

    let for_author = stack
        .questions
        .list(request, SortKey::Newest, &actor_of(&author))
        .await
        .unwrap();
    assert_eq!(for_author.items[0].title, "visible title");

    let for_admin = stack
        .questions
        .list(request, SortKey::Newest, &actor_of(&admin))
        .await
        .unwrap();
    assert_eq!(for_admin.items[0].title, "visible title");
}

#[tokio::test]
async fn double_delete_is_rejected() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let actor = actor_of(&author);

    let question = stack
        .questions
        .create(&actor, "q", "c", Visibility::Public, None)
        .await
        .unwrap();

    stack.questions.delete(question.question_id, &actor).await.unwrap();
    let err = stack
        .questions
        .delete(question.question_id, &actor)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "question", .. }));
}

#[tokio::test]
async fn stranger_cannot_update_or_delete() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let stranger = register_user(&stack, "stranger@example.com").await;

    let question = stack
        .questions
        .create(&actor_of(&author), "q", "c", Visibility::Public, None)
        .await
        .unwrap();

    let err = stack
        .questions
        .update(
            question.question_id,
            &actor_of(&stranger),
            QuestionPatch {
                content: Some("defaced".to_string()),
                ..QuestionPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));

    let err = stack
        .questions
        .delete(question.question_id, &actor_of(&stranger))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));
}

#[tokio::test]
async fn partial_patch_leaves_absent_fields_alone() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let actor = actor_of(&author);

    let question = stack
        .questions
        .create(&actor, "original title", "original content", Visibility::Public, None)
        .await
        .unwrap();

    let updated = stack
        .questions
        .update(
            question.question_id,
            &actor,
            QuestionPatch {
                content: Some("revised content".to_string()),
                ..QuestionPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "original title");
    assert_eq!(updated.content, "revised content");
    assert_eq!(updated.visibility, Visibility::Public);
}

#[tokio::test]
async fn toggle_round_trip_through_service() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let liker = register_user(&stack, "liker@example.com").await;

    let question = stack
        .questions
        .create(&actor_of(&author), "q", "c", Visibility::Public, None)
        .await
        .unwrap();

    let on = stack
        .likes
        .toggle(question.question_id, &actor_of(&liker))
        .await
        .unwrap();
    assert!(on.liked);
    assert_eq!(on.like_count, 1);

    let off = stack
        .likes
        .toggle(question.question_id, &actor_of(&liker))
        .await
        .unwrap();
    assert!(!off.liked);
    assert_eq!(off.like_count, 0);
}

#[tokio::test]
async fn quit_cascades_and_cannot_repeat() {
    let stack = stack().await;
    let author = register_user(&stack, "quitter@example.com").await;
    let actor = actor_of(&author);

    stack
        .questions
        .create(&actor, "will vanish", "c", Visibility::Public, None)
        .await
        .unwrap();

    stack.members.quit(author.member_id, &actor).await.unwrap();

    // The member's questions disappear from listings.
    let listed = stack
        .questions
        .list(PageRequest::new(1, 10).unwrap(), SortKey::Newest, &actor)
        .await
        .unwrap();
    assert!(listed.items.is_empty());

    // Quitting twice fails; the transition happens exactly once.
    let err = stack.members.quit(author.member_id, &actor).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "member", .. }));

    // A quit member can no longer create questions or log in.
    let err = stack
        .questions
        .create(&actor, "too late", "c", Visibility::Public, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "member", .. }));

    let err = stack
        .auth
        .login("quitter@example.com", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));
}

#[tokio::test]
async fn login_refresh_and_logout_flow() {
    let stack = stack().await;
    let member = register_user(&stack, "login@example.com").await;

    let err = stack
        .auth
        .login("login@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));

    let err = stack
        .auth
        .login("nobody@example.com", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let pair = stack.auth.login("login@example.com", "password123").await.unwrap();

    let claims = stack
        .tokens
        .verify(&pair.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.sub, member.member_id.to_string());

    let refreshed = stack.auth.refresh(&pair.refresh_token).await.unwrap();
    let claims = stack.tokens.verify(&refreshed, TokenKind::Access).unwrap();
    assert_eq!(claims.email, "login@example.com");

    // An access token is not accepted where a refresh token is expected.
    assert!(stack.auth.refresh(&pair.access_token).await.is_err());

    stack.auth.logout(&actor_of(&member));
}

#[tokio::test]
async fn profile_update_is_partial_and_owner_gated() {
    let stack = stack().await;
    let member = register_user(&stack, "profile@example.com").await;
    let stranger = register_user(&stack, "stranger@example.com").await;

    let err = stack
        .members
        .update(
            member.member_id,
            &actor_of(&stranger),
            MemberPatch {
                name: Some("hijacked".to_string()),
                ..MemberPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized { .. }));

    let updated = stack
        .members
        .update(
            member.member_id,
            &actor_of(&member),
            MemberPatch {
                phone: Some("010-9999-9999".to_string()),
                ..MemberPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "tester");
    assert_eq!(updated.phone, "010-9999-9999");
}

#[tokio::test]
async fn question_image_failure_falls_back_to_placeholder() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let actor = actor_of(&author);

    let stored = stack
        .questions
        .create(
            &actor,
            "with image",
            "c",
            Visibility::Public,
            Some(ImageUpload {
                file_name: "snapshot.png".to_string(),
                bytes: b"png-bytes".to_vec(),
            }),
        )
        .await
        .unwrap();
    assert!(stored.image.ends_with(".png"));

    // A rejected upload falls back to the placeholder; creation succeeds.
    let fallback = stack
        .questions
        .create(
            &actor,
            "with bad image",
            "c",
            Visibility::Public,
            Some(ImageUpload {
                file_name: "payload.exe".to_string(),
                bytes: b"bytes".to_vec(),
            }),
        )
        .await
        .unwrap();
    assert_eq!(fallback.image, qanda_core::DEFAULT_QUESTION_IMAGE);
}

#[tokio::test]
async fn view_count_grows_with_reads() {
    let stack = stack().await;
    let author = register_user(&stack, "author@example.com").await;
    let actor = actor_of(&author);

    let question = stack
        .questions
        .create(&actor, "viewed", "c", Visibility::Public, None)
        .await
        .unwrap();

    stack.questions.read(question.question_id, &actor).await.unwrap();
    let second = stack.questions.read(question.question_id, &actor).await.unwrap();
    // The second read observes the first read's bump.
    assert_eq!(second.question.view_count, 1);
}
