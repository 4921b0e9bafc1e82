//! Site alert repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder,
};
use tribune_common::{AppError, AppResult};

use crate::entities::{Alert, alert};

/// Repository for site-wide alerts.
#[derive(Clone)]
pub struct AlertRepository {
    db: Arc<DatabaseConnection>,
}

impl AlertRepository {
    /// Create a new alert repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an alert by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<alert::Model>> {
        Alert::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All alerts, newest first.
    pub async fn list(&self) -> AppResult<Vec<alert::Model>> {
        Alert::find()
            .order_by(alert::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active alerts, newest first.
    pub async fn find_active(&self) -> AppResult<Vec<alert::Model>> {
        Alert::find()
            .filter(alert::Column::Active.eq(true))
            .order_by(alert::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an alert.
    pub async fn create(&self, model: alert::ActiveModel) -> AppResult<alert::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an alert.
    pub async fn update(&self, model: alert::ActiveModel) -> AppResult<alert::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an alert. Returns whether a row was deleted.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Alert::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::alert::AlertLevel;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_active() {
        let alert = alert::Model {
            id: "al1".to_string(),
            message: "Motion de censure adoptée".to_string(),
            link: Some("/articles/motion-de-censure".to_string()),
            level: AlertLevel::Breaking,
            active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alert]])
                .into_connection(),
        );

        let repo = AlertRepository::new(db);
        let result = repo.find_active().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].level, AlertLevel::Breaking);
    }
}
