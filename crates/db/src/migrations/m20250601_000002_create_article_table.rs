//! Create article table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Article::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Article::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Article::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Article::Slug).string_len(256).not_null().unique_key())
                    .col(ColumnDef::new(Article::Excerpt).text())
                    .col(ColumnDef::new(Article::Content).text().not_null())
                    .col(ColumnDef::new(Article::Category).string_len(64).not_null())
                    .col(ColumnDef::new(Article::ImageUrl).string_len(1024))
                    .col(ColumnDef::new(Article::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Article::Published).boolean().not_null().default(false))
                    .col(ColumnDef::new(Article::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Article::Views).integer().not_null().default(0))
                    .col(ColumnDef::new(Article::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Article::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Article::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_author")
                            .from(Article::Table, Article::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: category (for section pages)
        manager
            .create_index(
                Index::create()
                    .name("idx_article_category")
                    .table(Article::Table)
                    .col(Article::Category)
                    .to_owned(),
            )
            .await?;

        // Index: (published, created_at) for the public listing
        manager
            .create_index(
                Index::create()
                    .name("idx_article_published_created_at")
                    .table(Article::Table)
                    .col(Article::Published)
                    .col(Article::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: featured
        manager
            .create_index(
                Index::create()
                    .name("idx_article_featured")
                    .table(Article::Table)
                    .col(Article::Featured)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Article::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Content,
    Category,
    ImageUrl,
    AuthorId,
    Published,
    Featured,
    Views,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
