//! Create alert table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Alert::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Alert::Message).text().not_null())
                    .col(ColumnDef::new(Alert::Link).string_len(1024))
                    .col(ColumnDef::new(Alert::Level).string_len(16).not_null().default("info"))
                    .col(ColumnDef::new(Alert::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Alert::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Alert::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: active
        manager
            .create_index(
                Index::create()
                    .name("idx_alert_active")
                    .table(Alert::Table)
                    .col(Alert::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Alert {
    Table,
    Id,
    Message,
    Link,
    Level,
    Active,
    CreatedAt,
    UpdatedAt,
}
