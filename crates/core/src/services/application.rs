//! Team application service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use tribune_common::{AppError, AppResult, IdGenerator};
use tribune_db::{
    entities::{application, application::ApplicationStatus},
    repositories::ApplicationRepository,
};
use validator::Validate;

/// A public application to join the team.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitApplicationInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email, length(max = 256))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub position: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// Service for team applications.
#[derive(Clone)]
pub struct ApplicationService {
    application_repo: ApplicationRepository,
    id_gen: IdGenerator,
}

impl ApplicationService {
    /// Create a new application service.
    #[must_use]
    pub const fn new(application_repo: ApplicationRepository) -> Self {
        Self {
            application_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a submission. It always starts pending.
    pub async fn submit(&self, input: SubmitApplicationInput) -> AppResult<application::Model> {
        input.validate()?;

        let model = application::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email),
            position: Set(input.position),
            message: Set(input.message),
            status: Set(ApplicationStatus::Pending),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let application = self.application_repo.create(model).await?;

        info!(application_id = %application.id, position = %application.position, "Application submitted");

        Ok(application)
    }

    /// List applications, optionally by status.
    pub async fn list(
        &self,
        status: Option<ApplicationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<application::Model>> {
        self.application_repo.list(status, limit, offset).await
    }

    /// Accept or reject an application. `None` when it does not exist.
    pub async fn set_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> AppResult<Option<application::Model>> {
        if status == ApplicationStatus::Pending {
            return Err(AppError::Validation(
                "An application cannot be moved back to pending".to_string(),
            ));
        }

        let Some(existing) = self.application_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: application::ActiveModel = existing.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));

        let application = self.application_repo.update(active).await?;

        info!(application_id = %id, status = ?application.status, "Application status changed");

        Ok(Some(application))
    }

    /// Delete an application. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        self.application_repo.delete(id).await
    }
}
