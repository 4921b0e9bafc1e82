//! Article repository.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    sea_query::{Expr, Func},
};
use serde::Deserialize;
use tribune_common::{AppError, AppResult};

use super::insert_error;
use crate::entities::{Article, article};

/// Conjunctive filter over the article list.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Calendar year of publication (creation when never published).
    pub year: Option<i32>,
    pub published: Option<bool>,
    pub author_id: Option<String>,
}

/// Sort order of the article list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleSort {
    #[default]
    Newest,
    Oldest,
    Views,
    Title,
}

impl ArticleSort {
    const fn order(self) -> (article::Column, Order) {
        match self {
            Self::Newest => (article::Column::CreatedAt, Order::Desc),
            Self::Oldest => (article::Column::CreatedAt, Order::Asc),
            Self::Views => (article::Column::Views, Order::Desc),
            Self::Title => (article::Column::Title, Order::Asc),
        }
    }
}

impl ArticleFilter {
    fn apply(&self, mut query: Select<Article>) -> Select<Article> {
        if let Some(category) = &self.category {
            query = query.filter(article::Column::Category.eq(category.as_str()));
        }

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query
                .filter(Expr::expr(Func::lower(Expr::col(article::Column::Title))).like(pattern));
        }

        if let Some(condition) = self.year.and_then(year_condition) {
            query = query.filter(condition);
        }

        if let Some(published) = self.published {
            query = query.filter(article::Column::Published.eq(published));
        }

        if let Some(author_id) = &self.author_id {
            query = query.filter(article::Column::AuthorId.eq(author_id.as_str()));
        }

        query
    }
}

/// Rows whose publication date (or creation date, when unpublished) falls in `year`.
fn year_condition(year: i32) -> Option<Condition> {
    let start = new_year(year)?;
    let end = new_year(year.checked_add(1)?)?;

    Some(
        Condition::any()
            .add(
                Condition::all()
                    .add(article::Column::PublishedAt.gte(start))
                    .add(article::Column::PublishedAt.lt(end)),
            )
            .add(
                Condition::all()
                    .add(article::Column::PublishedAt.is_null())
                    .add(article::Column::CreatedAt.gte(start))
                    .add(article::Column::CreatedAt.lt(end)),
            ),
    )
}

fn new_year(year: i32) -> Option<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// The key of an active model, whether freshly set or loaded.
fn model_id(model: &article::ActiveModel) -> Option<String> {
    match &model.id {
        ActiveValue::Set(id) | ActiveValue::Unchanged(id) => Some(id.clone()),
        ActiveValue::NotSet => None,
    }
}

/// Article repository for database operations.
#[derive(Clone)]
pub struct ArticleRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleRepository {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an article by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<article::Model>> {
        Article::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an article by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<article::Model>> {
        Article::find()
            .filter(article::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The featured article, if any.
    pub async fn find_featured(&self) -> AppResult<Option<article::Model>> {
        Article::find()
            .filter(article::Column::Featured.eq(true))
            .filter(article::Column::Published.eq(true))
            .order_by(article::Column::UpdatedAt, Order::Desc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List articles matching a filter (paginated).
    pub async fn list(
        &self,
        filter: &ArticleFilter,
        sort: ArticleSort,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        let (column, order) = sort.order();

        filter
            .apply(Article::find())
            .order_by(column, order)
            .order_by(article::Column::Id, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count articles matching a filter.
    pub async fn count(&self, filter: &ArticleFilter) -> AppResult<u64> {
        filter
            .apply(Article::find())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an article. Featuring it un-features every other article.
    pub async fn create(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if matches!(model.featured, ActiveValue::Set(true)) {
            Self::clear_featured(&txn, model_id(&model).as_deref()).await?;
        }

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| insert_error(e, "Article slug"))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Persist a patched article. Featuring it un-features every other article.
    pub async fn update(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if matches!(model.featured, ActiveValue::Set(true)) {
            Self::clear_featured(&txn, model_id(&model).as_deref()).await?;
        }

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| insert_error(e, "Article slug"))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    async fn clear_featured<C>(conn: &C, keep: Option<&str>) -> AppResult<()>
    where
        C: sea_orm::ConnectionTrait,
    {
        let mut query = Article::update_many()
            .col_expr(article::Column::Featured, Expr::value(false))
            .filter(article::Column::Featured.eq(true));

        if let Some(keep) = keep {
            query = query.filter(article::Column::Id.ne(keep));
        }

        query
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Count one view (single UPDATE query, no fetch).
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Article::update_many()
            .col_expr(article::Column::Views, Expr::col(article::Column::Views).add(1))
            .filter(article::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an article. Returns whether a row was deleted.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Article::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
