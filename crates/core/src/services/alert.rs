//! Site-wide alert banners.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use tribune_common::{AppResult, IdGenerator};
use tribune_db::{
    entities::{alert, alert::AlertLevel},
    repositories::AlertRepository,
};
use validator::Validate;

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAlertInput {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,

    #[validate(url)]
    pub link: Option<String>,

    #[serde(default)]
    pub level: AlertLevel,

    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAlertInput {
    #[validate(length(min = 1, max = 1000))]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub link: Option<Option<String>>,

    pub level: Option<AlertLevel>,

    pub active: Option<bool>,
}

/// Service for alert banners.
#[derive(Clone)]
pub struct AlertService {
    alert_repo: AlertRepository,
    id_gen: IdGenerator,
}

impl AlertService {
    #[must_use]
    pub const fn new(alert_repo: AlertRepository) -> Self {
        Self {
            alert_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Alerts currently shown to readers.
    pub async fn active(&self) -> AppResult<Vec<alert::Model>> {
        self.alert_repo.find_active().await
    }

    pub async fn list(&self) -> AppResult<Vec<alert::Model>> {
        self.alert_repo.list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<alert::Model>> {
        self.alert_repo.find_by_id(id).await
    }

    pub async fn create(&self, input: CreateAlertInput) -> AppResult<alert::Model> {
        input.validate()?;

        let model = alert::ActiveModel {
            id: Set(self.id_gen.generate()),
            message: Set(input.message),
            link: Set(input.link),
            level: Set(input.level),
            active: Set(input.active),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let alert = self.alert_repo.create(model).await?;

        info!(alert_id = %alert.id, level = ?alert.level, "Alert created");

        Ok(alert)
    }

    pub async fn update(
        &self,
        id: &str,
        input: UpdateAlertInput,
    ) -> AppResult<Option<alert::Model>> {
        input.validate()?;

        let Some(existing) = self.alert_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: alert::ActiveModel = existing.into();

        if let Some(message) = input.message {
            active.message = Set(message);
        }
        if let Some(link) = input.link {
            active.link = Set(link);
        }
        if let Some(level) = input.level {
            active.level = Set(level);
        }
        if let Some(is_active) = input.active {
            active.active = Set(is_active);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.alert_repo.update(active).await.map(Some)
    }

    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        self.alert_repo.delete(id).await
    }
}
