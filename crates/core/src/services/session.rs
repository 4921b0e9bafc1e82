//! Cookie sessions.
//!
//! The cookie carries a random token; only its SHA-256 digest is stored, so a
//! leaked session table cannot be replayed.

use chrono::{Duration, Utc};
use sea_orm::Set;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use tribune_common::{AppResult, IdGenerator, config::SessionConfig};
use tribune_db::{
    entities::{session, user},
    repositories::{SessionRepository, UserRepository},
};

/// A freshly issued session with the token to hand to the client.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: session::Model,
}

/// Service for login sessions.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
    ttl: Duration,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(
        session_repo: SessionRepository,
        user_repo: UserRepository,
        config: &SessionConfig,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            id_gen: IdGenerator::new(),
            ttl: Duration::hours(config.ttl_hours),
        }
    }

    /// Session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for `user_id`.
    pub async fn issue(&self, user_id: &str) -> AppResult<IssuedSession> {
        let token = self.id_gen.generate_token();
        let now = Utc::now();

        let session = self
            .session_repo
            .create(session::ActiveModel {
                id: Set(digest(&token)),
                user_id: Set(user_id.to_string()),
                created_at: Set(now.into()),
                expires_at: Set((now + self.ttl).into()),
            })
            .await?;

        info!(user_id = %user_id, "Session opened");

        Ok(IssuedSession { token, session })
    }

    /// The user behind a cookie token, if the session is still valid.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<user::Model>> {
        let Some(session) = self.session_repo.find_valid(&digest(token)).await? else {
            return Ok(None);
        };

        self.user_repo.find_by_id(&session.user_id).await
    }

    /// Close the session behind a cookie token.
    pub async fn revoke(&self, token: &str) -> AppResult<bool> {
        self.session_repo.delete(&digest(token)).await
    }

    /// Close every session of a user.
    pub async fn revoke_all(&self, user_id: &str) -> AppResult<u64> {
        let count = self.session_repo.delete_by_user(user_id).await?;

        if count > 0 {
            info!(user_id = %user_id, count, "Sessions revoked");
        }

        Ok(count)
    }

    /// Drop expired sessions.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let count = self.session_repo.purge_expired().await?;
        debug!(count, "Expired sessions purged");
        Ok(count)
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use tribune_db::entities::user::UserRole;

    fn service(db: Arc<DatabaseConnection>) -> SessionService {
        SessionService::new(
            SessionRepository::new(db.clone()),
            UserRepository::new(db),
            &SessionConfig::default(),
        )
    }

    fn create_test_session(id: &str) -> session::Model {
        session::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            created_at: Utc::now().into(),
            expires_at: (Utc::now() + Duration::hours(1)).into(),
        }
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        let d = digest("token");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("token"));
        assert_ne!(d, digest("other"));
    }

    #[test]
    fn test_ttl_from_config() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        assert_eq!(service(db).ttl(), Duration::hours(168));
    }

    #[tokio::test]
    async fn test_issue_stores_digest_not_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_session("stored")]])
                .into_connection(),
        );

        let service = service(db.clone());
        let issued = service.issue("u1").await.unwrap();
        drop(service);

        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).unwrap().into_transaction_log()
        );
        assert!(!log.contains(&issued.token));
        assert!(log.contains(&digest(&issued.token)));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<session::Model>::new()])
                .into_connection(),
        );

        assert!(service(db).resolve("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_returns_user() {
        let user = user::Model {
            id: "u1".to_string(),
            username: "cmartin".to_string(),
            password_hash: "hash".to_string(),
            display_name: None,
            title: None,
            avatar_url: None,
            role: UserRole::Admin,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_session("digest")]])
                .append_query_results([[user]])
                .into_connection(),
        );

        let resolved = service(db).resolve("token").await.unwrap().unwrap();
        assert_eq!(resolved.id, "u1");
    }
}
