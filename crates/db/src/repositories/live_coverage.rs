//! Live coverage repository.
//!
//! Covers the coverage rows and their three child tables (updates, questions,
//! editor links). Multi-step writes run in a single transaction.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tribune_common::{AppError, AppResult};

use super::insert_error;
use crate::entities::{
    LiveCoverage, LiveCoverageEditor, LiveCoverageQuestion, LiveCoverageUpdate, live_coverage,
    live_coverage_editor, live_coverage_question, live_coverage_question::QuestionStatus,
    live_coverage_update,
};

/// Repository for live coverages and their feed.
#[derive(Clone)]
pub struct LiveCoverageRepository {
    db: Arc<DatabaseConnection>,
}

impl LiveCoverageRepository {
    /// Create a new live coverage repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Coverage Operations ====================

    /// Find a coverage by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<live_coverage::Model>> {
        LiveCoverage::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a coverage by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<live_coverage::Model>> {
        LiveCoverage::find()
            .filter(live_coverage::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List coverages, newest first.
    pub async fn list(&self, active_only: bool) -> AppResult<Vec<live_coverage::Model>> {
        let mut query = LiveCoverage::find();

        if active_only {
            query = query.filter(live_coverage::Column::Active.eq(true));
        }

        query
            .order_by(live_coverage::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The most recently created active coverage.
    pub async fn find_primary_active(&self) -> AppResult<Option<live_coverage::Model>> {
        LiveCoverage::find()
            .filter(live_coverage::Column::Active.eq(true))
            .order_by(live_coverage::Column::CreatedAt, Order::Desc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a coverage. A duplicate slug yields `Conflict`.
    pub async fn create(&self, model: live_coverage::ActiveModel) -> AppResult<live_coverage::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Live coverage slug"))
    }

    /// Persist a patched coverage.
    pub async fn update(&self, model: live_coverage::ActiveModel) -> AppResult<live_coverage::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a coverage together with its updates, questions and editor links.
    ///
    /// Children go first, in that order, then the coverage row. Returns
    /// whether the coverage row existed.
    pub async fn delete_cascade(&self, id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        LiveCoverageUpdate::delete_many()
            .filter(live_coverage_update::Column::CoverageId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        LiveCoverageQuestion::delete_many()
            .filter(live_coverage_question::Column::CoverageId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        LiveCoverageEditor::delete_many()
            .filter(live_coverage_editor::Column::CoverageId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = LiveCoverage::delete_many()
            .filter(live_coverage::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted.rows_affected > 0)
    }

    // ==================== Update Operations ====================

    /// Find a feed update by ID.
    pub async fn find_update_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<live_coverage_update::Model>> {
        LiveCoverageUpdate::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Updates of a coverage, newest first.
    pub async fn list_updates(
        &self,
        coverage_id: &str,
    ) -> AppResult<Vec<live_coverage_update::Model>> {
        LiveCoverageUpdate::find()
            .filter(live_coverage_update::Column::CoverageId.eq(coverage_id))
            .order_by(live_coverage_update::Column::Timestamp, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a feed update.
    pub async fn create_update(
        &self,
        model: live_coverage_update::ActiveModel,
    ) -> AppResult<live_coverage_update::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a feed update.
    ///
    /// With `revert_answer` set, deleting the last answer to a question also
    /// clears that question's `answered` flag, in the same transaction.
    pub async fn delete_update(&self, id: &str, revert_answer: bool) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(update) = LiveCoverageUpdate::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(false);
        };

        LiveCoverageUpdate::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if revert_answer && update.is_answer {
            if let Some(question_id) = update.question_id.as_deref() {
                let remaining = LiveCoverageUpdate::find()
                    .filter(live_coverage_update::Column::QuestionId.eq(question_id))
                    .filter(live_coverage_update::Column::IsAnswer.eq(true))
                    .count(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                if remaining == 0 {
                    LiveCoverageQuestion::update_many()
                        .col_expr(live_coverage_question::Column::Answered, Expr::value(false))
                        .col_expr(
                            live_coverage_question::Column::UpdatedAt,
                            Expr::value(Utc::now()),
                        )
                        .filter(live_coverage_question::Column::Id.eq(question_id))
                        .exec(&txn)
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                }
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Insert an answer update and mark its question approved and answered.
    ///
    /// Both writes commit together or not at all.
    pub async fn insert_answer(
        &self,
        answer: live_coverage_update::ActiveModel,
        question_id: &str,
    ) -> AppResult<(live_coverage_update::Model, live_coverage_question::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let update = answer
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let question = LiveCoverageQuestion::find_by_id(question_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {question_id}")))?;

        let mut active: live_coverage_question::ActiveModel = question.into();
        active.status = Set(QuestionStatus::Approved);
        active.answered = Set(true);
        active.updated_at = Set(Utc::now().into());

        let question = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((update, question))
    }

    // ==================== Question Operations ====================

    /// Find a question by ID.
    pub async fn find_question_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<live_coverage_question::Model>> {
        LiveCoverageQuestion::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Questions of a coverage, newest first, optionally narrowed to one status.
    pub async fn list_questions(
        &self,
        coverage_id: &str,
        status: Option<QuestionStatus>,
    ) -> AppResult<Vec<live_coverage_question::Model>> {
        let mut query = LiveCoverageQuestion::find()
            .filter(live_coverage_question::Column::CoverageId.eq(coverage_id));

        if let Some(status) = status {
            query = query.filter(live_coverage_question::Column::Status.eq(status));
        }

        query
            .order_by(live_coverage_question::Column::Timestamp, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a question.
    pub async fn create_question(
        &self,
        model: live_coverage_question::ActiveModel,
    ) -> AppResult<live_coverage_question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist a moderated question.
    pub async fn update_question(
        &self,
        model: live_coverage_question::ActiveModel,
    ) -> AppResult<live_coverage_question::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Editor Operations ====================

    /// Editor links of a coverage, oldest first.
    pub async fn list_editors(
        &self,
        coverage_id: &str,
    ) -> AppResult<Vec<live_coverage_editor::Model>> {
        LiveCoverageEditor::find()
            .filter(live_coverage_editor::Column::CoverageId.eq(coverage_id))
            .order_by(live_coverage_editor::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the link between a coverage and a user.
    pub async fn find_editor(
        &self,
        coverage_id: &str,
        editor_id: &str,
    ) -> AppResult<Option<live_coverage_editor::Model>> {
        LiveCoverageEditor::find_by_id((coverage_id.to_string(), editor_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a user is assigned to a coverage.
    pub async fn is_editor(&self, coverage_id: &str, editor_id: &str) -> AppResult<bool> {
        let count = LiveCoverageEditor::find()
            .filter(live_coverage_editor::Column::CoverageId.eq(coverage_id))
            .filter(live_coverage_editor::Column::EditorId.eq(editor_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Insert an editor link.
    pub async fn add_editor(
        &self,
        model: live_coverage_editor::ActiveModel,
    ) -> AppResult<live_coverage_editor::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Editor link"))
    }

    /// Remove an editor link. Returns whether a row was deleted.
    pub async fn remove_editor(&self, coverage_id: &str, editor_id: &str) -> AppResult<bool> {
        let result = LiveCoverageEditor::delete_many()
            .filter(live_coverage_editor::Column::CoverageId.eq(coverage_id))
            .filter(live_coverage_editor::Column::EditorId.eq(editor_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
