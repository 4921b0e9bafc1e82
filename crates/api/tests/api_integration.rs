//! API integration tests.
//!
//! These tests drive the full router, session middleware included, over a
//! mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;
use tribune_api::{AppState, app};
use tribune_common::config::{
    Config, DatabaseConfig, LiveCoverageConfig, ServerConfig, SessionConfig,
};
use tribune_db::entities::{
    live_coverage, live_coverage_editor, live_coverage_question,
    live_coverage_question::QuestionStatus, live_coverage_update,
    live_coverage_update::UpdateKind, session, user, user::UserRole,
};

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            url: "https://tribune.example".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        session: SessionConfig::default(),
        live_coverage: LiveCoverageConfig::default(),
        admin: None,
    }
}

fn create_test_router(db: MockDatabase) -> Router {
    let state = AppState::new(Arc::new(db.into_connection()), &create_test_config());
    app(state)
}

fn create_test_user(id: &str, role: UserRole) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: format!("user-{id}"),
        password_hash: "hash".to_string(),
        display_name: Some("Camille Martin".to_string()),
        title: Some("Journaliste".to_string()),
        avatar_url: None,
        role,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn create_test_session(user_id: &str) -> session::Model {
    session::Model {
        id: "digest".to_string(),
        user_id: user_id.to_string(),
        created_at: Utc::now().into(),
        expires_at: (Utc::now() + Duration::hours(1)).into(),
    }
}

fn create_test_coverage(id: &str) -> live_coverage::Model {
    live_coverage::Model {
        id: id.to_string(),
        title: "Débat budgétaire".to_string(),
        slug: "debat-budgetaire".to_string(),
        subject: "Budget 2026".to_string(),
        context: String::new(),
        image_url: None,
        active: true,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn create_test_update(id: &str, kind: UpdateKind) -> live_coverage_update::Model {
    live_coverage_update::Model {
        id: id.to_string(),
        coverage_id: "cov1".to_string(),
        author_id: "u1".to_string(),
        content: "Ouverture de la séance".to_string(),
        timestamp: Utc::now().into(),
        important: true,
        kind,
        image_url: None,
        youtube_url: None,
        article_id: None,
        election_results: None,
        is_answer: false,
        question_id: None,
    }
}

fn create_test_question(status: QuestionStatus, answered: bool) -> live_coverage_question::Model {
    live_coverage_question::Model {
        id: "q1".to_string(),
        coverage_id: "cov1".to_string(),
        content: "Quand aura lieu le vote ?".to_string(),
        timestamp: Utc::now().into(),
        status,
        answered,
        updated_at: Utc::now().into(),
    }
}

fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
    maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
}

/// Mock database with a signed-in user resolved by the session middleware.
fn signed_in(role: UserRole) -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_session("u1")]])
        .append_query_results([[create_test_user("u1", role)]])
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn post_with_session(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::COOKIE, "tribune_session=token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_session(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header(header::COOKIE, "tribune_session=token")
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/nonexistent/endpoint")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_primary_without_active_coverage_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<live_coverage::Model>::new()]);
    let app = create_test_router(db);

    let response = app.oneshot(get("/live-coverages/primary")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_feed_includes_authors_and_poll_interval() {
    let update = create_test_update("up1", UpdateKind::Normal);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_coverage("cov1")]])
        .append_query_results([[update]])
        .append_query_results([[create_test_user("u1", UserRole::Editor)]]);
    let app = create_test_router(db);

    let response = app.oneshot(get("/live-coverages/cov1/updates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["pollIntervalSecs"], 10);
    assert_eq!(body["data"]["updates"][0]["important"], true);
    assert_eq!(body["data"]["updates"][0]["type"], "normal");
    assert_eq!(
        body["data"]["updates"][0]["author"]["displayName"],
        "Camille Martin"
    );
}

#[tokio::test]
async fn test_database_error_returns_500_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())]);
    let app = create_test_router(db);

    let response = app.oneshot(get("/live-coverages")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/admin/live-coverages")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_cannot_reach_staff_routes() {
    let app = create_test_router(signed_in(UserRole::Member));

    let response = app
        .oneshot(get_with_session("/admin/live-coverages"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_editor_cannot_manage_editors() {
    let app = create_test_router(signed_in(UserRole::Editor));

    let response = app
        .oneshot(get_with_session("/admin/live-coverages/cov1/editors"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_staff_lists_all_coverages() {
    let db = signed_in(UserRole::Editor).append_query_results([[create_test_coverage("cov1")]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(get_with_session("/admin/live-coverages"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["slug"], "debat-budgetaire");
}

#[tokio::test]
async fn test_me_returns_current_user_without_hash() {
    let app = create_test_router(signed_in(UserRole::Admin));

    let response = app.oneshot(get_with_session("/auth/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "user-u1");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_expired_session_is_anonymous() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<session::Model>::new()]);
    let app = create_test_router(db);

    let response = app.oneshot(get_with_session("/auth/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_question_with_invalid_json_returns_error() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/live-coverages/cov1/questions")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_moderation_rejects_unknown_status() {
    let app = create_test_router(signed_in(UserRole::Editor));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/live-coverages/questions/q1")
                .method("PATCH")
                .header(header::COOKIE, "tribune_session=token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"archived"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_login_with_unknown_user_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"ghost","password":"whatever"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_append_update_without_type_is_normal() {
    let db = signed_in(UserRole::Editor)
        .append_query_results([[create_test_coverage("cov1")]])
        .append_query_results([[count_row(1)]])
        .append_query_results([[create_test_update("up1", UpdateKind::Normal)]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/cov1/updates",
            r#"{"content":"Ouverture de la séance","important":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["type"], "normal");
    assert_eq!(body["data"]["important"], true);
}

#[tokio::test]
async fn test_append_youtube_update_checks_host() {
    let db = signed_in(UserRole::Admin).append_query_results([[create_test_coverage("cov1")]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/cov1/updates",
            r#"{"content":"En direct","type":"youtube","url":"https://vimeo.com/123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_append_youtube_update() {
    let stored = live_coverage_update::Model {
        youtube_url: Some("https://youtu.be/abc".to_string()),
        ..create_test_update("up1", UpdateKind::Youtube)
    };
    let db = signed_in(UserRole::Admin)
        .append_query_results([[create_test_coverage("cov1")]])
        .append_query_results([[stored]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/cov1/updates",
            r#"{"content":"En direct","type":"youtube","url":"https://youtu.be/abc"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["type"], "youtube");
    assert_eq!(body["data"]["youtubeUrl"], "https://youtu.be/abc");
}

#[tokio::test]
async fn test_append_election_update() {
    let stored = live_coverage_update::Model {
        election_results: Some(
            r#"{"title":"1er tour","display":"bar","candidates":[{"name":"Liste A","percentage":52.5}]}"#
                .to_string(),
        ),
        ..create_test_update("up1", UpdateKind::Election)
    };
    let db = signed_in(UserRole::Admin)
        .append_query_results([[create_test_coverage("cov1")]])
        .append_query_results([[stored]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/cov1/updates",
            r#"{"content":"Premiers résultats","type":"election","chart":{"title":"1er tour","candidates":[{"name":"Liste A","percentage":52.5},{"name":"Liste B","percentage":47.5}]}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["type"], "election");
    assert_eq!(body["data"]["electionResults"]["title"], "1er tour");
}

#[tokio::test]
async fn test_answer_route_for_assigned_editor() {
    let answer = live_coverage_update::Model {
        is_answer: true,
        question_id: Some("q1".to_string()),
        ..create_test_update("up1", UpdateKind::Normal)
    };
    let db = signed_in(UserRole::Editor)
        .append_query_results([[create_test_question(QuestionStatus::Pending, false)]])
        .append_query_results([[count_row(1)]])
        .append_query_results([[answer]])
        .append_query_results([[create_test_question(QuestionStatus::Pending, false)]])
        .append_query_results([[create_test_question(QuestionStatus::Approved, true)]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/questions/q1/answer",
            r#"{"coverageId":"cov1","content":"Le vote est prévu mardi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["update"]["isAnswer"], true);
    assert_eq!(body["data"]["update"]["questionId"], "q1");
    assert_eq!(body["data"]["question"]["status"], "approved");
    assert_eq!(body["data"]["question"]["answered"], true);
}

#[tokio::test]
async fn test_answer_route_for_unassigned_editor() {
    let db = signed_in(UserRole::Editor)
        .append_query_results([[create_test_question(QuestionStatus::Pending, false)]])
        .append_query_results([[count_row(0)]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/questions/q1/answer",
            r#"{"coverageId":"cov1","content":"Le vote est prévu mardi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_add_editor_returns_created_with_user() {
    let link = live_coverage_editor::Model {
        coverage_id: "cov1".to_string(),
        editor_id: "u2".to_string(),
        created_at: Utc::now().into(),
    };
    let db = signed_in(UserRole::Admin)
        .append_query_results([[create_test_coverage("cov1")]])
        .append_query_results([[create_test_user("u2", UserRole::Editor)]])
        .append_query_results([Vec::<live_coverage_editor::Model>::new()])
        .append_query_results([[link]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_with_session(
            "/admin/live-coverages/cov1/editors",
            r#"{"editorId":"u2"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["editorId"], "u2");
    assert_eq!(body["data"]["user"]["username"], "user-u2");
}

#[tokio::test]
async fn test_feed_survives_corrupt_election_chart() {
    let corrupt = live_coverage_update::Model {
        election_results: Some("{not json".to_string()),
        ..create_test_update("up1", UpdateKind::Election)
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_coverage("cov1")]])
        .append_query_results([[corrupt]])
        .append_query_results([[create_test_user("u1", UserRole::Editor)]]);
    let app = create_test_router(db);

    let response = app.oneshot(get("/live-coverages/cov1/updates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["updates"][0]["type"], "election");
    assert!(body["data"]["updates"][0]["electionResults"].is_null());
}
