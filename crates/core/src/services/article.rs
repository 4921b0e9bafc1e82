//! Article service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use tribune_common::{AppError, AppResult, IdGenerator};
use tribune_db::{
    entities::article,
    repositories::{ArticleFilter, ArticleRepository, ArticleSort},
};
use validator::Validate;

use crate::slug::is_valid_slug;

/// Input for creating an article.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 256))]
    pub slug: String,

    #[validate(length(max = 1024))]
    pub excerpt: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    #[validate(length(min = 1, max = 64))]
    pub category: String,

    #[validate(length(max = 1024))]
    pub image_url: Option<String>,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub featured: bool,
}

/// Partial update of an article.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub excerpt: Option<Option<String>>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub image_url: Option<Option<String>>,

    pub published: Option<bool>,

    pub featured: Option<bool>,
}

/// One page of articles with the total match count.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub articles: Vec<article::Model>,
    pub total: u64,
}

/// Service for articles.
#[derive(Clone)]
pub struct ArticleService {
    article_repo: ArticleRepository,
    id_gen: IdGenerator,
}

impl ArticleService {
    /// Create a new article service.
    #[must_use]
    pub const fn new(article_repo: ArticleRepository) -> Self {
        Self {
            article_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an article by ID.
    pub async fn get(&self, id: &str) -> AppResult<Option<article::Model>> {
        self.article_repo.find_by_id(id).await
    }

    /// Get an article by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<Option<article::Model>> {
        self.article_repo.find_by_slug(slug).await
    }

    /// Get a published article by slug and count the visit.
    pub async fn read_published(&self, slug: &str) -> AppResult<Option<article::Model>> {
        let Some(mut article) = self.article_repo.find_by_slug(slug).await? else {
            return Ok(None);
        };

        if !article.published {
            return Ok(None);
        }

        self.article_repo.increment_views(&article.id).await?;
        article.views = article.views.saturating_add(1);

        Ok(Some(article))
    }

    /// The featured article, if one is published.
    pub async fn featured(&self) -> AppResult<Option<article::Model>> {
        self.article_repo.find_featured().await
    }

    /// A filtered, sorted page of articles.
    pub async fn list(
        &self,
        filter: &ArticleFilter,
        sort: ArticleSort,
        limit: u64,
        offset: u64,
    ) -> AppResult<ArticlePage> {
        let articles = self.article_repo.list(filter, sort, limit, offset).await?;
        let total = self.article_repo.count(filter).await?;

        Ok(ArticlePage { articles, total })
    }

    /// Create an article written by `author_id`.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateArticleInput,
    ) -> AppResult<article::Model> {
        input.validate()?;
        ensure_slug(&input.slug)?;

        let now = Utc::now();
        let model = article::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            excerpt: Set(input.excerpt),
            content: Set(input.content),
            category: Set(input.category),
            image_url: Set(input.image_url),
            author_id: Set(author_id.to_string()),
            published: Set(input.published),
            featured: Set(input.featured),
            views: Set(0),
            published_at: Set(input.published.then(|| now.into())),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let article = self.article_repo.create(model).await?;

        info!(article_id = %article.id, slug = %article.slug, featured = article.featured, "Article created");

        Ok(article)
    }

    /// Patch an article. `None` when it does not exist.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateArticleInput,
    ) -> AppResult<Option<article::Model>> {
        input.validate()?;

        if let Some(slug) = &input.slug {
            ensure_slug(slug)?;
        }

        let Some(existing) = self.article_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let first_publication = input.published == Some(true) && existing.published_at.is_none();
        let mut active: article::ActiveModel = existing.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(excerpt) = input.excerpt {
            active.excerpt = Set(excerpt);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(published) = input.published {
            active.published = Set(published);
        }
        if first_publication {
            active.published_at = Set(Some(now.into()));
        }
        if let Some(featured) = input.featured {
            active.featured = Set(featured);
        }

        active.updated_at = Set(Some(now.into()));

        let article = self.article_repo.update(active).await?;

        if input.featured == Some(true) {
            info!(article_id = %article.id, "Article featured");
        }

        Ok(Some(article))
    }

    /// Delete an article. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let deleted = self.article_repo.delete(id).await?;

        if deleted {
            info!(article_id = %id, "Article deleted");
        }

        Ok(deleted)
    }
}

fn ensure_slug(slug: &str) -> AppResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Slug must be lowercase letters, digits and single hyphens".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_article(id: &str, featured: bool) -> article::Model {
        article::Model {
            id: id.to_string(),
            title: "Le budget adopté".to_string(),
            slug: format!("budget-{id}"),
            excerpt: None,
            content: "Texte".to_string(),
            category: "politique".to_string(),
            image_url: None,
            author_id: "u1".to_string(),
            published: true,
            featured,
            views: 3,
            published_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_input(slug: &str, featured: bool) -> CreateArticleInput {
        CreateArticleInput {
            title: "Le budget adopté".to_string(),
            slug: slug.to_string(),
            excerpt: None,
            content: "Texte".to_string(),
            category: "politique".to_string(),
            image_url: None,
            published: true,
            featured,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = ArticleService::new(ArticleRepository::new(db));

        let result = service.create("u1", create_input("Budget_2026", false)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_featuring_clears_previous_featured() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[create_test_article("a", true)]])
                .into_connection(),
        );

        let service = ArticleService::new(ArticleRepository::new(db.clone()));
        let article = service
            .create("u1", create_input("budget-a", true))
            .await
            .unwrap();
        drop(service);

        assert!(article.featured);

        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).unwrap().into_transaction_log()
        );
        assert!(log.contains(r#"SET \"featured\" = $1 WHERE \"article\".\"featured\" = $2"#));
    }

    #[tokio::test]
    async fn test_read_published_counts_view() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article("a", false)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = ArticleService::new(ArticleRepository::new(db));
        let article = service.read_published("budget-a").await.unwrap().unwrap();

        assert_eq!(article.views, 4);
    }

    #[tokio::test]
    async fn test_read_unpublished_is_hidden() {
        let draft = article::Model {
            published: false,
            published_at: None,
            ..create_test_article("a", false)
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .into_connection(),
        );

        let service = ArticleService::new(ArticleRepository::new(db));
        assert!(service.read_published("budget-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_returns_total() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_article("a", false),
                    create_test_article("b", false),
                ]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12)),
                }]])
                .into_connection(),
        );

        let service = ArticleService::new(ArticleRepository::new(db));
        let page = service
            .list(&ArticleFilter::default(), ArticleSort::Newest, 2, 0)
            .await
            .unwrap();

        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.total, 12);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );

        let service = ArticleService::new(ArticleRepository::new(db));
        let result = service
            .update("missing", UpdateArticleInput::default())
            .await
            .unwrap();

        assert!(result.is_none());
    }
}
