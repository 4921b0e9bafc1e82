//! Newsroom live coverage endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tribune_common::{AppError, AppResult};
use tribune_core::{
    AnswerQuestionInput, AppendUpdateInput, CoverageEditor, CreateCoverageInput,
    ModerateQuestionInput, UpdateCoverageInput,
};
use tribune_db::entities::live_coverage_question::QuestionStatus;

use super::live_coverages::{CoverageResponse, QuestionResponse, UpdateResponse};
use super::users::UserResponse;
use crate::{
    extractors::{AdminUser, AuthUser, StaffUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the admin live coverage router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_coverage))
        .route(
            "/{id}",
            get(get_coverage).put(update_coverage).delete(delete_coverage),
        )
        .route("/{id}/updates", post(append_update))
        .route("/updates/{update_id}", delete(delete_update))
        .route("/{id}/questions", get(list_questions))
        .route("/questions/{id}", patch(moderate_question))
        .route("/questions/{id}/answer", post(answer_question))
        .route("/{id}/editors", get(list_editors).post(add_editor))
        .route("/{id}/editors/{editor_id}", delete(remove_editor))
}

/// Questions filter.
#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub status: Option<QuestionStatus>,
}

/// Answer request: the coverage the answer is published to, and the answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub coverage_id: String,
    #[serde(flatten)]
    pub answer: AnswerQuestionInput,
}

/// Answer response.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub update: UpdateResponse,
    pub question: QuestionResponse,
}

/// Add editor request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEditorRequest {
    pub editor_id: String,
}

/// Editor assignment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorResponse {
    pub coverage_id: String,
    pub editor_id: String,
    pub assigned_at: DateTime<Utc>,
    pub user: Option<UserResponse>,
}

impl From<CoverageEditor> for EditorResponse {
    fn from(editor: CoverageEditor) -> Self {
        Self {
            coverage_id: editor.link.coverage_id,
            editor_id: editor.link.editor_id,
            assigned_at: editor.link.created_at.with_timezone(&Utc),
            user: editor.user.map(Into::into),
        }
    }
}

// ==================== Coverages ====================

async fn list_all(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CoverageResponse>>> {
    let coverages = state.live_coverage_service.list_coverages(false).await?;

    Ok(ApiResponse::ok(
        coverages.into_iter().map(Into::into).collect(),
    ))
}

async fn create_coverage(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCoverageInput>,
) -> AppResult<(StatusCode, ApiResponse<CoverageResponse>)> {
    let coverage = state.live_coverage_service.create_coverage(input).await?;

    Ok(ApiResponse::created(coverage.into()))
}

async fn get_coverage(
    StaffUser(_): StaffUser,
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

async fn update_coverage(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCoverageInput>,
) -> AppResult<ApiResponse<CoverageResponse>> {
    let coverage = state
        .live_coverage_service
        .update_coverage(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Live coverage not found: {id}")))?;

    Ok(ApiResponse::ok(coverage.into()))
}

async fn delete_coverage(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.live_coverage_service.delete_coverage(&id).await? {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("Live coverage not found: {id}")))
    }
}

// ==================== Feed ====================

async fn append_update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AppendUpdateInput>,
) -> AppResult<(StatusCode, ApiResponse<UpdateResponse>)> {
    let update = state
        .live_coverage_service
        .append_update(&id, &user, input)
        .await?;

    Ok(ApiResponse::created(update.into()))
}

async fn delete_update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(update_id): Path<String>,
) -> AppResult<StatusCode> {
    if state
        .live_coverage_service
        .delete_update(&update_id, &user)
        .await?
    {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("Update not found: {update_id}")))
    }
}

// ==================== Questions ====================

async fn list_questions(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<QuestionsQuery>,
) -> AppResult<ApiResponse<Vec<QuestionResponse>>> {
    let questions = state
        .live_coverage_service
        .list_questions(&id, query.status)
        .await?;

    Ok(ApiResponse::ok(
        questions.into_iter().map(Into::into).collect(),
    ))
}

async fn moderate_question(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ModerateQuestionInput>,
) -> AppResult<ApiResponse<QuestionResponse>> {
    let question = state
        .live_coverage_service
        .moderate_question(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))?;

    Ok(ApiResponse::ok(question.into()))
}

async fn answer_question(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> AppResult<(StatusCode, ApiResponse<AnswerResponse>)> {
    let answered = state
        .live_coverage_service
        .answer_question(&id, &req.coverage_id, &user, req.answer)
        .await?;

    Ok(ApiResponse::created(AnswerResponse {
        update: answered.update.into(),
        question: answered.question.into(),
    }))
}

// ==================== Editors ====================

async fn list_editors(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<EditorResponse>>> {
    let editors = state.live_coverage_service.list_editors(&id).await?;

    Ok(ApiResponse::ok(editors.into_iter().map(Into::into).collect()))
}

async fn add_editor(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddEditorRequest>,
) -> AppResult<(StatusCode, ApiResponse<EditorResponse>)> {
    let editor = state
        .live_coverage_service
        .add_editor(&id, &req.editor_id)
        .await?;

    Ok(ApiResponse::created(editor.into()))
}

async fn remove_editor(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path((id, editor_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let removed = state
        .live_coverage_service
        .remove_editor(&id, &editor_id)
        .await?;

    Ok(ApiResponse::ok(serde_json::json!({ "removed": removed })))
}
