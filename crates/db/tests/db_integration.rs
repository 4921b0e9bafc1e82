//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p tribune-db --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `tribune_test`)
//!   `TEST_DB_PASSWORD` (default: `tribune_test`)
//!   `TEST_DB_NAME` (default: `tribune_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use tribune_common::AppError;
use tribune_db::{
    entities::{
        article, live_coverage, live_coverage_editor, live_coverage_question,
        live_coverage_question::QuestionStatus, live_coverage_update,
        live_coverage_update::UpdateKind, user, user::UserRole,
    },
    repositories::{ArticleRepository, LiveCoverageRepository, UserRepository},
    test_utils::{TestDatabase, TestDbConfig},
};

async fn setup() -> (TestDatabase, Arc<sea_orm::DatabaseConnection>) {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.expect("Cleanup failed");
    let conn = Arc::new(
        sea_orm::Database::connect(&db.config.database_url())
            .await
            .expect("Failed to connect"),
    );
    (db, conn)
}

async fn insert_user(repo: &UserRepository, id: &str) -> user::Model {
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user-{id}")),
        password_hash: Set("hash".to_string()),
        display_name: Set(Some("Camille Martin".to_string())),
        title: Set(None),
        avatar_url: Set(None),
        role: Set(UserRole::Editor),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap()
}

fn coverage(id: &str, slug: &str) -> live_coverage::ActiveModel {
    live_coverage::ActiveModel {
        id: Set(id.to_string()),
        title: Set("Débat budgétaire".to_string()),
        slug: Set(slug.to_string()),
        subject: Set("Budget".to_string()),
        context: Set("Séance publique".to_string()),
        image_url: Set(None),
        active: Set(true),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
}

fn update(id: &str, coverage_id: &str, author_id: &str) -> live_coverage_update::ActiveModel {
    live_coverage_update::ActiveModel {
        id: Set(id.to_string()),
        coverage_id: Set(coverage_id.to_string()),
        author_id: Set(author_id.to_string()),
        content: Set("Ouverture de la séance".to_string()),
        timestamp: Set(Utc::now().into()),
        important: Set(true),
        kind: Set(UpdateKind::Normal),
        image_url: Set(None),
        youtube_url: Set(None),
        article_id: Set(None),
        election_results: Set(None),
        is_answer: Set(false),
        question_id: Set(None),
    }
}

fn question(id: &str, coverage_id: &str) -> live_coverage_question::ActiveModel {
    live_coverage_question::ActiveModel {
        id: Set(id.to_string()),
        coverage_id: Set(coverage_id.to_string()),
        content: Set("Quand aura lieu le vote ?".to_string()),
        timestamp: Set(Utc::now().into()),
        status: Set(QuestionStatus::Pending),
        answered: Set(false),
        updated_at: Set(Utc::now().into()),
    }
}

fn article(id: &str, author_id: &str, featured: bool) -> article::ActiveModel {
    article::ActiveModel {
        id: Set(id.to_string()),
        title: Set(format!("Article {id}")),
        slug: Set(format!("article-{id}")),
        excerpt: Set(None),
        content: Set("Contenu".to_string()),
        category: Set("politique".to_string()),
        image_url: Set(None),
        author_id: Set(author_id.to_string()),
        published: Set(true),
        featured: Set(featured),
        views: Set(0),
        published_at: Set(Some(Utc::now().into())),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_slug_is_conflict() {
    let (_db, conn) = setup().await;
    let repo = LiveCoverageRepository::new(conn);

    repo.create(coverage("cov1", "debat-budgetaire")).await.unwrap();
    let second = repo.create(coverage("cov2", "debat-budgetaire")).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_delete_cascade_removes_children() {
    let (_db, conn) = setup().await;
    let users = UserRepository::new(conn.clone());
    let repo = LiveCoverageRepository::new(conn);

    insert_user(&users, "u1").await;
    repo.create(coverage("cov1", "debat")).await.unwrap();
    repo.create_update(update("up1", "cov1", "u1")).await.unwrap();
    repo.create_question(question("q1", "cov1")).await.unwrap();
    repo.add_editor(live_coverage_editor::ActiveModel {
        coverage_id: Set("cov1".to_string()),
        editor_id: Set("u1".to_string()),
        created_at: Set(Utc::now().into()),
    })
    .await
    .unwrap();

    assert!(repo.delete_cascade("cov1").await.unwrap());

    assert!(repo.find_by_id("cov1").await.unwrap().is_none());
    assert!(repo.list_updates("cov1").await.unwrap().is_empty());
    assert!(repo.list_questions("cov1", None).await.unwrap().is_empty());
    assert!(repo.list_editors("cov1").await.unwrap().is_empty());
    assert!(!repo.delete_cascade("cov1").await.unwrap());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_insert_answer_marks_question() {
    let (_db, conn) = setup().await;
    let users = UserRepository::new(conn.clone());
    let repo = LiveCoverageRepository::new(conn);

    insert_user(&users, "u1").await;
    repo.create(coverage("cov1", "debat")).await.unwrap();
    repo.create_question(question("q1", "cov1")).await.unwrap();

    let mut answer = update("up1", "cov1", "u1");
    answer.is_answer = Set(true);
    answer.question_id = Set(Some("q1".to_string()));

    let (update, question) = repo.insert_answer(answer, "q1").await.unwrap();

    assert!(update.is_answer);
    assert_eq!(question.status, QuestionStatus::Approved);
    assert!(question.answered);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_single_featured_article() {
    let (_db, conn) = setup().await;
    let users = UserRepository::new(conn.clone());
    let repo = ArticleRepository::new(conn);

    insert_user(&users, "u1").await;
    repo.create(article("b", "u1", true)).await.unwrap();
    repo.create(article("a", "u1", true)).await.unwrap();

    let a = repo.find_by_id("a").await.unwrap().unwrap();
    let b = repo.find_by_id("b").await.unwrap().unwrap();

    assert!(a.featured);
    assert!(!b.featured);
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
