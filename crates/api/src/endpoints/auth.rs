//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use tracing::info;
use tribune_common::AppResult;
use validator::Validate;

use super::users::UserResponse;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Sign in and receive the session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<UserResponse>)> {
    req.validate()?;

    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;

    let issued = state.session_service.issue(&user.id).await?;

    let cookie = Cookie::build((state.cookie.name.clone(), issued.token))
        .path("/")
        .http_only(true)
        .secure(state.cookie.secure)
        .same_site(SameSite::Lax)
        .build();

    info!(user_id = %user.id, "User logged in");

    Ok((jar.add(cookie), ApiResponse::ok(user.into())))
}

/// Close the current session and clear the cookie.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<serde_json::Value>)> {
    if let Some(cookie) = jar.get(&state.cookie.name) {
        state.session_service.revoke(cookie.value()).await?;
    }

    info!(user_id = %user.id, "User logged out");

    let jar = jar.remove(Cookie::build(state.cookie.name.clone()).path("/"));

    Ok((jar, ApiResponse::ok(serde_json::json!({ "ok": true }))))
}

/// The signed-in user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}
