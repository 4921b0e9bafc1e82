//! Live coverage service.
//!
//! Owns the liveblog rules: who may post to a coverage, what a feed update may
//! carry, and how visitor questions move through moderation. Every read goes
//! back to the store; nothing is cached between calls.
//!
//! Question lifecycle:
//!
//! ```text
//! pending --(moderate: approved)--> approved
//! pending --(moderate: rejected)--> rejected
//! pending --(answer)------------->  approved, answered
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tribune_common::{AppError, AppResult, IdGenerator, config::LiveCoverageConfig};
use tribune_db::{
    entities::{
        live_coverage, live_coverage_editor, live_coverage_question,
        live_coverage_question::QuestionStatus, live_coverage_update,
        live_coverage_update::UpdateKind, user, user::UserRole,
    },
    repositories::{ArticleRepository, LiveCoverageRepository, UserRepository},
};
use url::Url;
use validator::Validate;

use super::election::ElectionChart;
use crate::slug::is_valid_slug;

/// Hosts accepted for embedded videos.
const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "youtu.be",
    "www.youtube-nocookie.com",
];

const fn default_true() -> bool {
    true
}

/// Input for creating a coverage.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoverageInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 256))]
    pub slug: String,

    #[validate(length(min = 1, max = 256))]
    pub subject: String,

    #[validate(length(max = 10000))]
    #[serde(default)]
    pub context: String,

    #[validate(length(max = 1024))]
    pub image_url: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,
}

/// Partial update of a coverage.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoverageInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub subject: Option<String>,

    #[validate(length(max = 10000))]
    pub context: Option<String>,

    /// `null` removes the image.
    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub image_url: Option<Option<String>>,

    pub active: Option<bool>,
}

/// Rich content carried by a feed update.
///
/// Selected on the wire by a `type` field; a body without one is a normal update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawUpdatePayload")]
pub enum UpdatePayload {
    Normal { image_url: Option<String> },
    Youtube { url: String },
    Article { article_id: String },
    Election { chart: ElectionChart },
    Recap,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PayloadTag {
    Normal,
    Youtube,
    Article,
    Election,
    Recap,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUpdatePayload {
    #[serde(rename = "type", default)]
    tag: Option<PayloadTag>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    article_id: Option<String>,
    #[serde(default)]
    chart: Option<ElectionChart>,
}

impl TryFrom<RawUpdatePayload> for UpdatePayload {
    type Error = String;

    fn try_from(raw: RawUpdatePayload) -> Result<Self, Self::Error> {
        let missing = |field: &str, tag: &str| format!("missing field `{field}` for {tag} update");

        match raw.tag.unwrap_or(PayloadTag::Normal) {
            PayloadTag::Normal => Ok(Self::Normal {
                image_url: raw.image_url,
            }),
            PayloadTag::Youtube => raw
                .url
                .map(|url| Self::Youtube { url })
                .ok_or_else(|| missing("url", "youtube")),
            PayloadTag::Article => raw
                .article_id
                .map(|article_id| Self::Article { article_id })
                .ok_or_else(|| missing("articleId", "article")),
            PayloadTag::Election => raw
                .chart
                .map(|chart| Self::Election { chart })
                .ok_or_else(|| missing("chart", "election")),
            PayloadTag::Recap => Ok(Self::Recap),
        }
    }
}

impl Default for UpdatePayload {
    fn default() -> Self {
        Self::Normal { image_url: None }
    }
}

/// Input for appending an update to a coverage feed.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppendUpdateInput {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    #[serde(default)]
    pub important: bool,

    #[serde(flatten)]
    pub payload: UpdatePayload,
}

/// Byline shown next to a feed update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub display_name: String,
    pub title: Option<String>,
    pub avatar_url: Option<String>,
}

impl AuthorSummary {
    /// Build a byline, or nothing when the user has no display name.
    #[must_use]
    pub fn from_user(user: &user::Model) -> Option<Self> {
        let display_name = user.display_name.as_deref().filter(|n| !n.trim().is_empty())?;

        Some(Self {
            display_name: display_name.to_string(),
            title: user.title.clone(),
            avatar_url: user.avatar_url.clone(),
        })
    }
}

/// A feed update with its author's byline.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub update: live_coverage_update::Model,
    pub author: Option<AuthorSummary>,
}

/// Input for a visitor question.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuestionInput {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// Moderation decision on a question.
#[derive(Debug, Deserialize)]
pub struct ModerateQuestionInput {
    pub status: QuestionStatus,

    #[serde(default)]
    pub answered: bool,
}

/// Input for answering a question in the feed.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerQuestionInput {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    #[serde(default)]
    pub important: bool,
}

/// Result of answering a question.
#[derive(Debug, Clone)]
pub struct AnsweredQuestion {
    pub update: live_coverage_update::Model,
    pub question: live_coverage_question::Model,
}

/// An editor link with the linked user, when it still exists.
#[derive(Debug, Clone)]
pub struct CoverageEditor {
    pub link: live_coverage_editor::Model,
    pub user: Option<user::Model>,
}

/// Service for live coverages.
#[derive(Clone)]
pub struct LiveCoverageService {
    coverage_repo: LiveCoverageRepository,
    user_repo: UserRepository,
    article_repo: ArticleRepository,
    id_gen: IdGenerator,
    revert_answer_on_delete: bool,
}

impl LiveCoverageService {
    /// Create a new live coverage service.
    #[must_use]
    pub const fn new(
        coverage_repo: LiveCoverageRepository,
        user_repo: UserRepository,
        article_repo: ArticleRepository,
        config: &LiveCoverageConfig,
    ) -> Self {
        Self {
            coverage_repo,
            user_repo,
            article_repo,
            id_gen: IdGenerator::new(),
            revert_answer_on_delete: config.revert_answer_on_delete,
        }
    }

    // ==================== Coverage Operations ====================

    /// Get a coverage by ID.
    pub async fn get_coverage(&self, id: &str) -> AppResult<Option<live_coverage::Model>> {
        self.coverage_repo.find_by_id(id).await
    }

    /// Get a coverage by slug.
    pub async fn get_coverage_by_slug(
        &self,
        slug: &str,
    ) -> AppResult<Option<live_coverage::Model>> {
        self.coverage_repo.find_by_slug(slug).await
    }

    /// List coverages, newest first.
    pub async fn list_coverages(&self, active_only: bool) -> AppResult<Vec<live_coverage::Model>> {
        self.coverage_repo.list(active_only).await
    }

    /// The coverage promoted on the home page: the newest active one.
    pub async fn primary_coverage(&self) -> AppResult<Option<live_coverage::Model>> {
        self.coverage_repo.find_primary_active().await
    }

    /// Create a coverage.
    pub async fn create_coverage(
        &self,
        input: CreateCoverageInput,
    ) -> AppResult<live_coverage::Model> {
        input.validate()?;

        if !is_valid_slug(&input.slug) {
            return Err(AppError::Validation(
                "Slug must be lowercase letters, digits and single hyphens".to_string(),
            ));
        }

        if self.coverage_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Live coverage slug already exists: {}",
                input.slug
            )));
        }

        let now = Utc::now();
        let model = live_coverage::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            subject: Set(input.subject),
            context: Set(input.context),
            image_url: Set(input.image_url),
            active: Set(input.active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let coverage = self.coverage_repo.create(model).await?;

        info!(coverage_id = %coverage.id, slug = %coverage.slug, "Live coverage created");

        Ok(coverage)
    }

    /// Patch a coverage. `None` when it does not exist.
    pub async fn update_coverage(
        &self,
        id: &str,
        input: UpdateCoverageInput,
    ) -> AppResult<Option<live_coverage::Model>> {
        input.validate()?;

        let Some(coverage) = self.coverage_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: live_coverage::ActiveModel = coverage.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(subject) = input.subject {
            active.subject = Set(subject);
        }
        if let Some(context) = input.context {
            active.context = Set(context);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(is_active) = input.active {
            active.active = Set(is_active);
        }

        active.updated_at = Set(Utc::now().into());

        self.coverage_repo.update(active).await.map(Some)
    }

    /// Delete a coverage and everything attached to it.
    pub async fn delete_coverage(&self, id: &str) -> AppResult<bool> {
        let deleted = self.coverage_repo.delete_cascade(id).await?;

        if deleted {
            info!(coverage_id = %id, "Live coverage deleted");
        }

        Ok(deleted)
    }

    // ==================== Feed Operations ====================

    /// Whether `user` may post to or delete from the coverage's feed.
    pub async fn can_edit(&self, coverage_id: &str, user: &user::Model) -> AppResult<bool> {
        if user.role == UserRole::Admin {
            return Ok(true);
        }

        self.coverage_repo.is_editor(coverage_id, &user.id).await
    }

    /// Append an update to a coverage feed.
    pub async fn append_update(
        &self,
        coverage_id: &str,
        author: &user::Model,
        input: AppendUpdateInput,
    ) -> AppResult<live_coverage_update::Model> {
        input.validate()?;

        if input.content.trim().is_empty() {
            return Err(AppError::Validation("Update content is empty".to_string()));
        }

        if self.coverage_repo.find_by_id(coverage_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Live coverage not found: {coverage_id}"
            )));
        }

        if !self.can_edit(coverage_id, author).await? {
            return Err(AppError::Forbidden(
                "Only admins and assigned editors can post to this coverage".to_string(),
            ));
        }

        let mut model = live_coverage_update::ActiveModel {
            id: Set(self.id_gen.generate()),
            coverage_id: Set(coverage_id.to_string()),
            author_id: Set(author.id.clone()),
            content: Set(input.content),
            timestamp: Set(Utc::now().into()),
            important: Set(input.important),
            kind: Set(UpdateKind::Normal),
            image_url: Set(None),
            youtube_url: Set(None),
            article_id: Set(None),
            election_results: Set(None),
            is_answer: Set(false),
            question_id: Set(None),
        };

        match input.payload {
            UpdatePayload::Normal { image_url } => {
                model.image_url = Set(image_url);
            }
            UpdatePayload::Youtube { url } => {
                validate_youtube_url(&url)?;
                model.kind = Set(UpdateKind::Youtube);
                model.youtube_url = Set(Some(url));
            }
            UpdatePayload::Article { article_id } => {
                if self.article_repo.find_by_id(&article_id).await?.is_none() {
                    return Err(AppError::BadRequest(format!(
                        "Referenced article not found: {article_id}"
                    )));
                }
                model.kind = Set(UpdateKind::Article);
                model.article_id = Set(Some(article_id));
            }
            UpdatePayload::Election { chart } => {
                chart.validate()?;
                if let Some(warning) = chart.percentage_warning() {
                    warn!(coverage_id = %coverage_id, warning = %warning, "Election chart percentages out of tolerance");
                }
                let encoded = serde_json::to_string(&chart)
                    .map_err(|e| AppError::Internal(format!("Failed to encode chart: {e}")))?;
                model.kind = Set(UpdateKind::Election);
                model.election_results = Set(Some(encoded));
            }
            UpdatePayload::Recap => {
                model.kind = Set(UpdateKind::Recap);
            }
        }

        let update = self.coverage_repo.create_update(model).await?;

        info!(
            coverage_id = %coverage_id,
            update_id = %update.id,
            author_id = %author.id,
            kind = ?update.kind,
            important = update.important,
            "Live coverage update appended"
        );

        Ok(update)
    }

    /// The coverage feed, newest first, with author bylines.
    pub async fn list_updates(&self, coverage_id: &str) -> AppResult<Vec<FeedEntry>> {
        let updates = self.coverage_repo.list_updates(coverage_id).await?;

        let mut author_ids: Vec<String> = updates.iter().map(|u| u.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(updates
            .into_iter()
            .map(|update| {
                let author = authors
                    .get(&update.author_id)
                    .and_then(AuthorSummary::from_user);
                FeedEntry { update, author }
            })
            .collect())
    }

    /// Delete a feed update on behalf of `actor`. Returns whether it existed.
    pub async fn delete_update(&self, id: &str, actor: &user::Model) -> AppResult<bool> {
        let Some(update) = self.coverage_repo.find_update_by_id(id).await? else {
            return Ok(false);
        };

        if !self.can_edit(&update.coverage_id, actor).await? {
            return Err(AppError::Forbidden(
                "Only admins and assigned editors can delete from this coverage".to_string(),
            ));
        }

        let deleted = self
            .coverage_repo
            .delete_update(id, self.revert_answer_on_delete)
            .await?;

        if deleted {
            info!(update_id = %id, coverage_id = %update.coverage_id, actor_id = %actor.id, "Live coverage update deleted");
        }

        Ok(deleted)
    }

    // ==================== Question Operations ====================

    /// Questions of a coverage, newest first.
    pub async fn list_questions(
        &self,
        coverage_id: &str,
        status: Option<QuestionStatus>,
    ) -> AppResult<Vec<live_coverage_question::Model>> {
        self.coverage_repo.list_questions(coverage_id, status).await
    }

    /// Record a visitor question. It starts pending and unanswered.
    pub async fn submit_question(
        &self,
        coverage_id: &str,
        input: SubmitQuestionInput,
    ) -> AppResult<live_coverage_question::Model> {
        input.validate()?;

        if input.content.trim().is_empty() {
            return Err(AppError::Validation("Question is empty".to_string()));
        }

        let coverage = self
            .coverage_repo
            .find_by_id(coverage_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Live coverage not found: {coverage_id}")))?;

        if !coverage.active {
            return Err(AppError::BadRequest(
                "This live coverage is closed to questions".to_string(),
            ));
        }

        let now = Utc::now();
        let model = live_coverage_question::ActiveModel {
            id: Set(self.id_gen.generate()),
            coverage_id: Set(coverage_id.to_string()),
            content: Set(input.content),
            timestamp: Set(now.into()),
            status: Set(QuestionStatus::Pending),
            answered: Set(false),
            updated_at: Set(now.into()),
        };

        self.coverage_repo.create_question(model).await
    }

    /// Approve or reject a question. `None` when it does not exist.
    ///
    /// Questions never go back to pending, and `answered` is never cleared here.
    pub async fn moderate_question(
        &self,
        id: &str,
        input: ModerateQuestionInput,
    ) -> AppResult<Option<live_coverage_question::Model>> {
        if input.status == QuestionStatus::Pending {
            return Err(AppError::Validation(
                "A question cannot be moved back to pending".to_string(),
            ));
        }

        let Some(question) = self.coverage_repo.find_question_by_id(id).await? else {
            return Ok(None);
        };

        let answered = question.answered || input.answered;
        let mut active: live_coverage_question::ActiveModel = question.into();
        active.status = Set(input.status);
        active.answered = Set(answered);
        active.updated_at = Set(Utc::now().into());

        let question = self.coverage_repo.update_question(active).await?;

        info!(question_id = %id, status = ?question.status, answered = question.answered, "Question moderated");

        Ok(Some(question))
    }

    /// Publish an answer to a question in the feed and mark it answered.
    pub async fn answer_question(
        &self,
        question_id: &str,
        coverage_id: &str,
        author: &user::Model,
        input: AnswerQuestionInput,
    ) -> AppResult<AnsweredQuestion> {
        input.validate()?;

        if input.content.trim().is_empty() {
            return Err(AppError::Validation("Answer is empty".to_string()));
        }

        let question = self
            .coverage_repo
            .find_question_by_id(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {question_id}")))?;

        if question.coverage_id != coverage_id {
            return Err(AppError::BadRequest(
                "Question does not belong to this live coverage".to_string(),
            ));
        }

        if !self.can_edit(coverage_id, author).await? {
            return Err(AppError::Forbidden(
                "Not an editor of this live coverage".to_string(),
            ));
        }

        let answer = live_coverage_update::ActiveModel {
            id: Set(self.id_gen.generate()),
            coverage_id: Set(coverage_id.to_string()),
            author_id: Set(author.id.clone()),
            content: Set(input.content),
            timestamp: Set(Utc::now().into()),
            important: Set(input.important),
            kind: Set(UpdateKind::Normal),
            image_url: Set(None),
            youtube_url: Set(None),
            article_id: Set(None),
            election_results: Set(None),
            is_answer: Set(true),
            question_id: Set(Some(question_id.to_string())),
        };

        let (update, question) = self
            .coverage_repo
            .insert_answer(answer, question_id)
            .await?;

        info!(
            question_id = %question_id,
            update_id = %update.id,
            author_id = %author.id,
            "Question answered"
        );

        Ok(AnsweredQuestion { update, question })
    }

    // ==================== Editor Operations ====================

    /// Editors assigned to a coverage.
    pub async fn list_editors(&self, coverage_id: &str) -> AppResult<Vec<CoverageEditor>> {
        let links = self.coverage_repo.list_editors(coverage_id).await?;
        let ids: Vec<String> = links.iter().map(|l| l.editor_id.clone()).collect();

        let mut users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(links
            .into_iter()
            .map(|link| {
                let user = users.remove(&link.editor_id);
                CoverageEditor { link, user }
            })
            .collect())
    }

    /// Assign a user to a coverage. Returns the existing link if already assigned.
    pub async fn add_editor(&self, coverage_id: &str, editor_id: &str) -> AppResult<CoverageEditor> {
        if self.coverage_repo.find_by_id(coverage_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Live coverage not found: {coverage_id}"
            )));
        }

        let user = self
            .user_repo
            .find_by_id(editor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {editor_id}")))?;

        if let Some(existing) = self.coverage_repo.find_editor(coverage_id, editor_id).await? {
            return Ok(CoverageEditor {
                link: existing,
                user: Some(user),
            });
        }

        let link = self
            .coverage_repo
            .add_editor(live_coverage_editor::ActiveModel {
                coverage_id: Set(coverage_id.to_string()),
                editor_id: Set(editor_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        info!(coverage_id = %coverage_id, editor_id = %editor_id, "Editor assigned");

        Ok(CoverageEditor {
            link,
            user: Some(user),
        })
    }

    /// Unassign a user. Returns whether a link was removed.
    pub async fn remove_editor(&self, coverage_id: &str, editor_id: &str) -> AppResult<bool> {
        let removed = self.coverage_repo.remove_editor(coverage_id, editor_id).await?;

        if removed {
            info!(coverage_id = %coverage_id, editor_id = %editor_id, "Editor unassigned");
        }

        Ok(removed)
    }
}

fn validate_youtube_url(raw: &str) -> AppResult<()> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::Validation(format!("Invalid YouTube URL: {e}")))?;

    let scheme_ok = matches!(url.scheme(), "http" | "https");
    let host_ok = url
        .host_str()
        .is_some_and(|host| YOUTUBE_HOSTS.contains(&host));

    if scheme_ok && host_ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Not a YouTube URL: {raw}")))
    }
}
