//! Staff account administration.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use tribune_common::{AppError, AppResult};
use tribune_core::{CreateUserInput, UpdateUserInput};
use tribune_db::entities::{user, user::UserRole};

use super::Pagination;
use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the admin user router.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", patch(update_user).delete(delete_user))
}

/// User response. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            title: user.title,
            avatar_url: user.avatar_url,
            role: user.role,
            created_at: user.created_at.with_timezone(&Utc),
        }
    }
}

async fn list_users(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list(page.limit(), page.offset)
        .await?;

    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn create_user(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, ApiResponse<UserResponse>)> {
    let user = state.user_service.create(input).await?;

    Ok(ApiResponse::created(user.into()))
}

async fn update_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let credentials_changed = input.password.is_some() || input.role.is_some();

    let user = state
        .user_service
        .update(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))?;

    // Role and password changes take effect on the next login.
    if credentials_changed && user.id != admin.id {
        state.session_service.revoke_all(&user.id).await?;
    }

    info!(admin_id = %admin.id, user_id = %user.id, "User updated by admin");

    Ok(ApiResponse::ok(user.into()))
}

async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if admin.id == id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    if state.user_service.delete(&id).await? {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("User not found: {id}")))
    }
}
