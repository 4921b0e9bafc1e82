//! Alert banner endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tribune_common::{AppError, AppResult};
use tribune_core::{CreateAlertInput, UpdateAlertInput};
use tribune_db::entities::{alert, alert::AlertLevel};

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_active))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_alert))
        .route("/{id}", get(get_alert).put(update_alert).delete(delete_alert))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: String,
    pub message: String,
    pub link: Option<String>,
    pub level: AlertLevel,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<alert::Model> for AlertResponse {
    fn from(alert: alert::Model) -> Self {
        Self {
            id: alert.id,
            message: alert.message,
            link: alert.link,
            level: alert.level,
            active: alert.active,
            created_at: alert.created_at.with_timezone(&Utc),
            updated_at: alert.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

async fn list_active(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<AlertResponse>>> {
    let alerts = state.alert_service.active().await?;
    Ok(ApiResponse::ok(alerts.into_iter().map(Into::into).collect()))
}

async fn list_all(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AlertResponse>>> {
    let alerts = state.alert_service.list().await?;
    Ok(ApiResponse::ok(alerts.into_iter().map(Into::into).collect()))
}

async fn get_alert(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AlertResponse>> {
    let alert = state
        .alert_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert not found: {id}")))?;

    Ok(ApiResponse::ok(alert.into()))
}

async fn create_alert(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAlertInput>,
) -> AppResult<(StatusCode, ApiResponse<AlertResponse>)> {
    let alert = state.alert_service.create(input).await?;
    Ok(ApiResponse::created(alert.into()))
}

async fn update_alert(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAlertInput>,
) -> AppResult<ApiResponse<AlertResponse>> {
    let alert = state
        .alert_service
        .update(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert not found: {id}")))?;

    Ok(ApiResponse::ok(alert.into()))
}

async fn delete_alert(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.alert_service.delete(&id).await? {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("Alert not found: {id}")))
    }
}
