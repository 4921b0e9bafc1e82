//! Request extractors.
//!
//! The session middleware stores the signed-in user in the request
//! extensions; these extractors read it back and enforce roles.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use tribune_common::AppError;
use tribune_db::entities::{user, user::UserRole};

fn current_user(parts: &Parts) -> Option<user::Model> {
    parts.extensions.get::<user::Model>().cloned()
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).map(AuthUser).ok_or(AppError::Unauthorized)
    }
}

/// A signed-in admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).ok_or(AppError::Unauthorized)?;

        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(user))
    }
}

/// A signed-in admin or editor.
#[derive(Debug, Clone)]
pub struct StaffUser(pub user::Model);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).ok_or(AppError::Unauthorized)?;

        if !user.role.is_staff() {
            return Err(AppError::Forbidden("Staff access required".to_string()));
        }

        Ok(Self(user))
    }
}

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts)))
    }
}
