//! Create election table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Election::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Election::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Election::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Election::Date).date().not_null())
                    .col(ColumnDef::new(Election::ElectionType).string_len(64).not_null())
                    .col(ColumnDef::new(Election::Round).integer())
                    .col(ColumnDef::new(Election::Location).string_len(256))
                    .col(ColumnDef::new(Election::TotalVotes).big_integer())
                    .col(ColumnDef::new(Election::Results).json_binary().not_null())
                    .col(ColumnDef::new(Election::Display).string_len(8).not_null().default("bar"))
                    .col(
                        ColumnDef::new(Election::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Election::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: date (dashboards are listed newest first)
        manager
            .create_index(
                Index::create()
                    .name("idx_election_date")
                    .table(Election::Table)
                    .col(Election::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Election::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Election {
    Table,
    Id,
    Title,
    Date,
    ElectionType,
    Round,
    Location,
    TotalVotes,
    Results,
    Display,
    CreatedAt,
    UpdatedAt,
}
