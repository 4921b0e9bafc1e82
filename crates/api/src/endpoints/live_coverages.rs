//! Public live coverage endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use tribune_common::{AppError, AppResult};
use tribune_core::{AuthorSummary, FeedEntry, SubmitQuestionInput};
use tribune_db::entities::{
    live_coverage, live_coverage_question, live_coverage_question::QuestionStatus,
    live_coverage_update::UpdateKind,
};

use crate::{middleware::AppState, response::ApiResponse};

/// Create the public live coverage router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active))
        .route("/primary", get(get_primary))
        .route("/slug/{slug}", get(get_by_slug))
        .route("/{id}", get(get_coverage))
        .route("/{id}/updates", get(get_feed))
        .route("/{id}/questions", get(list_approved_questions).post(submit_question))
}

/// Coverage response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub subject: String,
    pub context: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<live_coverage::Model> for CoverageResponse {
    fn from(coverage: live_coverage::Model) -> Self {
        Self {
            id: coverage.id,
            title: coverage.title,
            slug: coverage.slug,
            subject: coverage.subject,
            context: coverage.context,
            image_url: coverage.image_url,
            active: coverage.active,
            created_at: coverage.created_at.with_timezone(&Utc),
            updated_at: coverage.updated_at.with_timezone(&Utc),
        }
    }
}

/// Feed update response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub id: String,
    pub coverage_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub important: bool,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub image_url: Option<String>,
    pub youtube_url: Option<String>,
    pub article_id: Option<String>,
    pub election_results: Option<serde_json::Value>,
    pub is_answer: bool,
    pub question_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
}

impl From<FeedEntry> for UpdateResponse {
    fn from(entry: FeedEntry) -> Self {
        let mut response = Self::from(entry.update);
        response.author = entry.author;
        response
    }
}

impl From<tribune_db::entities::live_coverage_update::Model> for UpdateResponse {
    fn from(update: tribune_db::entities::live_coverage_update::Model) -> Self {
        Self {
            id: update.id.clone(),
            coverage_id: update.coverage_id,
            content: update.content,
            timestamp: update.timestamp.with_timezone(&Utc),
            important: update.important,
            kind: update.kind,
            image_url: update.image_url,
            youtube_url: update.youtube_url,
            article_id: update.article_id,
            election_results: update.election_results.as_deref().and_then(|raw| {
                serde_json::from_str(raw)
                    .inspect_err(|e| {
                        warn!(update_id = %update.id, error = %e, "Stored election chart is not valid JSON");
                    })
                    .ok()
            }),
            is_answer: update.is_answer,
            question_id: update.question_id,
            author: None,
        }
    }
}

/// Question response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub coverage_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: QuestionStatus,
    pub answered: bool,
}

impl From<live_coverage_question::Model> for QuestionResponse {
    fn from(question: live_coverage_question::Model) -> Self {
        Self {
            id: question.id,
            coverage_id: question.coverage_id,
            content: question.content,
            timestamp: question.timestamp.with_timezone(&Utc),
            status: question.status,
            answered: question.answered,
        }
    }
}

/// Feed snapshot. Clients poll again after `poll_interval_secs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub updates: Vec<UpdateResponse>,
    pub poll_interval_secs: u64,
}

async fn list_active(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CoverageResponse>>> {
    let coverages = state.live_coverage_service.list_coverages(true).await?;

    Ok(ApiResponse::ok(
        coverages.into_iter().map(Into::into).collect(),
    ))
}

async fn get_primary(State(state): State<AppState>) -> AppResult<ApiResponse<CoverageResponse>> {
    let coverage = state
        .live_coverage_service
        .primary_coverage()
        .await?
        .ok_or_else(|| AppError::NotFound("No active live coverage".to_string()))?;

    Ok(ApiResponse::ok(coverage.into()))
}

async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<CoverageResponse>> {
    let coverage = state
        .live_coverage_service
        .get_coverage_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Live coverage not found: {slug}")))?;

    Ok(ApiResponse::ok(coverage.into()))
}

async fn get_coverage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CoverageResponse>> {
    let coverage = state
        .live_coverage_service
        .get_coverage(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Live coverage not found: {id}")))?;

    Ok(ApiResponse::ok(coverage.into()))
}

async fn get_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FeedResponse>> {
    if state.live_coverage_service.get_coverage(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Live coverage not found: {id}")));
    }

    let entries = state.live_coverage_service.list_updates(&id).await?;

    Ok(ApiResponse::ok(FeedResponse {
        updates: entries.into_iter().map(Into::into).collect(),
        poll_interval_secs: state.poll_interval_secs,
    }))
}

async fn list_approved_questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<QuestionResponse>>> {
    let questions = state
        .live_coverage_service
        .list_questions(&id, Some(QuestionStatus::Approved))
        .await?;

    Ok(ApiResponse::ok(
        questions.into_iter().map(Into::into).collect(),
    ))
}

async fn submit_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SubmitQuestionInput>,
) -> AppResult<(StatusCode, ApiResponse<QuestionResponse>)> {
    let question = state.live_coverage_service.submit_question(&id, input).await?;

    Ok(ApiResponse::created(question.into()))
}
