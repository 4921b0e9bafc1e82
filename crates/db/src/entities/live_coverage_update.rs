//! Live coverage update entity - one entry of a coverage feed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which rich payload an update carries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// Text, optionally with an image.
    #[sea_orm(string_value = "normal")]
    #[default]
    Normal,
    #[sea_orm(string_value = "youtube")]
    Youtube,
    #[sea_orm(string_value = "article")]
    Article,
    #[sea_orm(string_value = "election")]
    Election,
    /// Summary of the coverage so far; plain content only.
    #[sea_orm(string_value = "recap")]
    Recap,
}

/// Feed entry. Rows are never edited after insertion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "live_coverage_update")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub coverage_id: String,

    pub author_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Server-assigned at insert; the feed is ordered by it, newest first.
    pub timestamp: DateTimeWithTimeZone,

    pub important: bool,

    pub kind: UpdateKind,

    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    #[sea_orm(nullable)]
    pub youtube_url: Option<String>,

    #[sea_orm(nullable)]
    pub article_id: Option<String>,

    /// JSON-encoded election chart, rendered verbatim by clients.
    #[sea_orm(column_type = "Text", nullable)]
    pub election_results: Option<String>,

    pub is_answer: bool,

    /// Question this update answers, when `is_answer` is set.
    #[sea_orm(nullable)]
    pub question_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::live_coverage::Entity",
        from = "Column::CoverageId",
        to = "super::live_coverage::Column::Id"
    )]
    Coverage,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
    #[sea_orm(
        belongs_to = "super::live_coverage_question::Entity",
        from = "Column::QuestionId",
        to = "super::live_coverage_question::Column::Id"
    )]
    Question,
}

impl Related<super::live_coverage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coverage.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl Related<super::live_coverage_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
