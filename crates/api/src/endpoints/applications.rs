//! Team application endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tribune_common::{AppError, AppResult};
use tribune_core::SubmitApplicationInput;
use tribune_db::entities::{application, application::ApplicationStatus};

use super::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the public application router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_application))
}

/// Create the admin application router.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications))
        .route("/{id}", patch(set_status).delete(delete_application))
}

/// Application response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(application: application::Model) -> Self {
        Self {
            id: application.id,
            name: application.name,
            email: application.email,
            position: application.position,
            message: application.message,
            status: application.status,
            created_at: application.created_at.with_timezone(&Utc),
            updated_at: application.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Application list query.
#[derive(Debug, Deserialize)]
pub struct ListApplicationsQuery {
    pub status: Option<ApplicationStatus>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: ApplicationStatus,
}

async fn submit_application(
    State(state): State<AppState>,
    Json(input): Json<SubmitApplicationInput>,
) -> AppResult<(StatusCode, ApiResponse<ApplicationResponse>)> {
    let application = state.application_service.submit(input).await?;

    Ok(ApiResponse::created(application.into()))
}

async fn list_applications(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let applications = state
        .application_service
        .list(query.status, limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        applications.into_iter().map(Into::into).collect(),
    ))
}

async fn set_status(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let application = state
        .application_service
        .set_status(&id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application not found: {id}")))?;

    Ok(ApiResponse::ok(application.into()))
}

async fn delete_application(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.application_service.delete(&id).await? {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("Application not found: {id}")))
    }
}
