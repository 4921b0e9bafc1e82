//! Election entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How an election's results are charted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum ChartDisplay {
    #[sea_orm(string_value = "bar")]
    #[default]
    Bar,
    #[sea_orm(string_value = "pie")]
    Pie,
}

/// Election result dashboard.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "election")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// Polling day.
    pub date: Date,

    /// Kind of election (presidential, legislative, municipal, ...).
    pub election_type: String,

    #[sea_orm(nullable)]
    pub round: Option<i32>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    #[sea_orm(nullable)]
    pub total_votes: Option<i64>,

    /// Ordered candidate results (JSON array).
    pub results: Json,

    pub display: ChartDisplay,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
