//! Article endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tribune_common::{AppError, AppResult};
use tribune_core::{ArticlePage, CreateArticleInput, UpdateArticleInput};
use tribune_db::{
    entities::article,
    repositories::{ArticleFilter, ArticleSort},
};

use super::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::{
    extractors::{MaybeAuthUser, StaffUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the public article router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/featured", get(get_featured))
        .route("/{slug}", get(get_by_slug))
}

/// Create the admin article router.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_article))
        .route("/{id}", get(get_article).put(update_article).delete(delete_article))
}

/// Article response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub author_id: String,
    pub published: bool,
    pub featured: bool,
    pub views: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<article::Model> for ArticleResponse {
    fn from(article: article::Model) -> Self {
        Self {
            id: article.id,
            title: article.title,
            slug: article.slug,
            excerpt: article.excerpt,
            content: article.content,
            category: article.category,
            image_url: article.image_url,
            author_id: article.author_id,
            published: article.published,
            featured: article.featured,
            views: article.views,
            published_at: article.published_at.map(|t| t.with_timezone(&Utc)),
            created_at: article.created_at.with_timezone(&Utc),
            updated_at: article.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Article list response.
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub total: u64,
}

impl From<ArticlePage> for ArticleListResponse {
    fn from(page: ArticlePage) -> Self {
        Self {
            articles: page.articles.into_iter().map(Into::into).collect(),
            total: page.total,
        }
    }
}

/// Article list query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArticlesQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub sort: ArticleSort,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
    /// Admin only.
    pub published: Option<bool>,
    /// Admin only.
    pub author_id: Option<String>,
}

impl ListArticlesQuery {
    fn filter(&self) -> ArticleFilter {
        ArticleFilter {
            category: self.category.clone(),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            year: self.year,
            published: self.published,
            author_id: self.author_id.clone(),
        }
    }

    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> AppResult<ApiResponse<ArticleListResponse>> {
    let filter = ArticleFilter {
        published: Some(true),
        author_id: None,
        ..query.filter()
    };

    let page = state
        .article_service
        .list(&filter, query.sort, query.limit(), query.offset)
        .await?;

    Ok(ApiResponse::ok(page.into()))
}

async fn get_featured(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Option<ArticleResponse>>> {
    let article = state.article_service.featured().await?;

    Ok(ApiResponse::ok(article.map(Into::into)))
}

/// Readers get published articles and count a view; staff can preview drafts.
async fn get_by_slug(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<ArticleResponse>> {
    let is_staff = user.is_some_and(|u| u.role.is_staff());

    let article = if is_staff {
        state.article_service.get_by_slug(&slug).await?
    } else {
        state.article_service.read_published(&slug).await?
    };

    let article =
        article.ok_or_else(|| AppError::NotFound(format!("Article not found: {slug}")))?;

    Ok(ApiResponse::ok(article.into()))
}

async fn list_all(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> AppResult<ApiResponse<ArticleListResponse>> {
    let page = state
        .article_service
        .list(&query.filter(), query.sort, query.limit(), query.offset)
        .await?;

    Ok(ApiResponse::ok(page.into()))
}

async fn get_article(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ArticleResponse>> {
    let article = state
        .article_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {id}")))?;

    Ok(ApiResponse::ok(article.into()))
}

async fn create_article(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateArticleInput>,
) -> AppResult<(StatusCode, ApiResponse<ArticleResponse>)> {
    let article = state.article_service.create(&user.id, input).await?;

    Ok(ApiResponse::created(article.into()))
}

async fn update_article(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateArticleInput>,
) -> AppResult<ApiResponse<ArticleResponse>> {
    let article = state
        .article_service
        .update(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {id}")))?;

    Ok(ApiResponse::ok(article.into()))
}

async fn delete_article(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.article_service.delete(&id).await? {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("Article not found: {id}")))
    }
}
