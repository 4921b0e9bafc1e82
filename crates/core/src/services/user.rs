//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use tribune_common::{AppError, AppResult, IdGenerator};
use tribune_db::{
    entities::{user, user::UserRole},
    repositories::UserRepository,
};
use validator::Validate;

#[allow(clippy::unwrap_used)]
static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// Input for creating a staff or member account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 64), regex(path = *USERNAME_PATTERN))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 128))]
    pub display_name: Option<String>,

    #[validate(length(max = 128))]
    pub title: Option<String>,

    #[validate(length(max = 1024))]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub role: UserRole,
}

/// Role and profile changes.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub display_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub avatar_url: Option<Option<String>>,

    pub role: Option<UserRole>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(id).await
    }

    /// List users, oldest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }

    /// Create a user. A taken username yields `Conflict`.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username already taken: {}",
                input.username
            )));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            password_hash: Set(password_hash),
            display_name: Set(input.display_name),
            title: Set(input.title),
            avatar_url: Set(input.avatar_url),
            role: Set(input.role),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;

        info!(user_id = %user.id, username = %user.username, role = ?user.role, "User created");

        Ok(user)
    }

    /// Update role, profile or password. `None` when the user does not exist.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateUserInput,
    ) -> AppResult<Option<user::Model>> {
        input.validate()?;

        let Some(existing) = self.user_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();

        if let Some(display_name) = input.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(avatar_url);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(password) = &input.password {
            active.password_hash = Set(hash_password(password)?);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        let user = self.user_repo.update(active).await?;

        if input.role.is_some() {
            info!(user_id = %user.id, role = ?user.role, "User role changed");
        }

        Ok(Some(user))
    }

    /// Delete a user. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let deleted = self.user_repo.delete(id).await?;

        if deleted {
            info!(user_id = %id, "User deleted");
        }

        Ok(deleted)
    }

    /// Authenticate by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Create the configured admin account on first start.
    ///
    /// An existing account with that username is left untouched.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_username(username).await? {
            return Ok(existing);
        }

        self.create(CreateUserInput {
            username: username.to_string(),
            password: password.to_string(),
            display_name: None,
            title: None,
            avatar_url: None,
            role: UserRole::Admin,
        })
        .await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
            display_name: Some("Camille Martin".to_string()),
            title: None,
            avatar_url: None,
            role: UserRole::Editor,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_username_pattern() {
        assert!(USERNAME_PATTERN.is_match("c.martin"));
        assert!(!USERNAME_PATTERN.is_match("c martin"));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let user = create_test_user("u1", "cmartin", "correct_password");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate("cmartin", "correct_password").await;

        assert_eq!(result.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let user = create_test_user("u1", "cmartin", "correct_password");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate("cmartin", "wrong_password").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate("ghost", "whatever").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let existing = create_test_user("u1", "cmartin", "correct_password");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .create(CreateUserInput {
                username: "cmartin".to_string(),
                password: "another_password".to_string(),
                display_name: None,
                title: None,
                avatar_url: None,
                role: UserRole::Member,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_keeps_existing() {
        let existing = create_test_user("u1", "admin", "correct_password");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let user = service.ensure_admin("admin", "new_password_1").await.unwrap();

        assert_eq!(user.id, "u1");
    }
}
