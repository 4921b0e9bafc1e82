//! Live coverage editor entity - users allowed to post to a coverage.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "live_coverage_editor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub coverage_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub editor_id: String,

    pub created_at: DateTimeWithTimeZone,
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
        from = "Column::EditorId",
        to = "super::user::Column::Id"
    )]
    Editor,
}

impl Related<super::live_coverage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coverage.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Editor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
