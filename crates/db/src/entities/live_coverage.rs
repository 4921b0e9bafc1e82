//! Live coverage entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A liveblog session.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "live_coverage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// URL-safe identifier, unique across coverages.
    #[sea_orm(unique)]
    pub slug: String,

    pub subject: String,

    /// Free-text context shown above the feed.
    #[sea_orm(column_type = "Text")]
    pub context: String,

    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    /// Several coverages may be active at once.
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::live_coverage_update::Entity")]
    Updates,
    #[sea_orm(has_many = "super::live_coverage_question::Entity")]
    Questions,
    #[sea_orm(has_many = "super::live_coverage_editor::Entity")]
    Editors,
}

impl Related<super::live_coverage_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Updates.def()
    }
}

impl Related<super::live_coverage_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::live_coverage_editor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Editors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
