//! Create live coverage tables migration.
//!
//! Child rows reference their coverage with `RESTRICT`: deleting a coverage
//! is done by the repository, children first, in a single transaction.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LiveCoverage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LiveCoverage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LiveCoverage::Title).string_len(256).not_null())
                    .col(ColumnDef::new(LiveCoverage::Slug).string_len(256).not_null())
                    .col(ColumnDef::new(LiveCoverage::Subject).string_len(256).not_null())
                    .col(ColumnDef::new(LiveCoverage::Context).text().not_null())
                    .col(ColumnDef::new(LiveCoverage::ImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(LiveCoverage::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(LiveCoverage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LiveCoverage::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: slug
        manager
            .create_index(
                Index::create()
                    .name("idx_live_coverage_slug")
                    .table(LiveCoverage::Table)
                    .col(LiveCoverage::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (active, created_at) for picking the primary coverage
        manager
            .create_index(
                Index::create()
                    .name("idx_live_coverage_active_created_at")
                    .table(LiveCoverage::Table)
                    .col(LiveCoverage::Active)
                    .col(LiveCoverage::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LiveCoverageEditor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LiveCoverageEditor::CoverageId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageEditor::EditorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageEditor::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(LiveCoverageEditor::CoverageId)
                            .col(LiveCoverageEditor::EditorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_editor_coverage")
                            .from(LiveCoverageEditor::Table, LiveCoverageEditor::CoverageId)
                            .to(LiveCoverage::Table, LiveCoverage::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_editor_user")
                            .from(LiveCoverageEditor::Table, LiveCoverageEditor::EditorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LiveCoverageQuestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LiveCoverageQuestion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageQuestion::CoverageId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LiveCoverageQuestion::Content).text().not_null())
                    .col(
                        ColumnDef::new(LiveCoverageQuestion::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageQuestion::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageQuestion::Answered)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageQuestion::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_question_coverage")
                            .from(LiveCoverageQuestion::Table, LiveCoverageQuestion::CoverageId)
                            .to(LiveCoverage::Table, LiveCoverage::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (coverage_id, timestamp) for the moderation queue
        manager
            .create_index(
                Index::create()
                    .name("idx_live_coverage_question_coverage_timestamp")
                    .table(LiveCoverageQuestion::Table)
                    .col(LiveCoverageQuestion::CoverageId)
                    .col(LiveCoverageQuestion::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LiveCoverageUpdate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::CoverageId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::AuthorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LiveCoverageUpdate::Content).text().not_null())
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::Important)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::Kind)
                            .string_len(16)
                            .not_null()
                            .default("normal"),
                    )
                    .col(ColumnDef::new(LiveCoverageUpdate::ImageUrl).string_len(1024))
                    .col(ColumnDef::new(LiveCoverageUpdate::YoutubeUrl).string_len(1024))
                    .col(ColumnDef::new(LiveCoverageUpdate::ArticleId).string_len(32))
                    .col(ColumnDef::new(LiveCoverageUpdate::ElectionResults).text())
                    .col(
                        ColumnDef::new(LiveCoverageUpdate::IsAnswer)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LiveCoverageUpdate::QuestionId).string_len(32))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_update_coverage")
                            .from(LiveCoverageUpdate::Table, LiveCoverageUpdate::CoverageId)
                            .to(LiveCoverage::Table, LiveCoverage::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_update_author")
                            .from(LiveCoverageUpdate::Table, LiveCoverageUpdate::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_update_article")
                            .from(LiveCoverageUpdate::Table, LiveCoverageUpdate::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_live_coverage_update_question")
                            .from(LiveCoverageUpdate::Table, LiveCoverageUpdate::QuestionId)
                            .to(LiveCoverageQuestion::Table, LiveCoverageQuestion::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (coverage_id, timestamp) for the feed
        manager
            .create_index(
                Index::create()
                    .name("idx_live_coverage_update_coverage_timestamp")
                    .table(LiveCoverageUpdate::Table)
                    .col(LiveCoverageUpdate::CoverageId)
                    .col(LiveCoverageUpdate::Timestamp)
                    .to_owned(),
            )
            .await?;

        // Index: question_id (answers of a question)
        manager
            .create_index(
                Index::create()
                    .name("idx_live_coverage_update_question_id")
                    .table(LiveCoverageUpdate::Table)
                    .col(LiveCoverageUpdate::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LiveCoverageUpdate::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LiveCoverageQuestion::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LiveCoverageEditor::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LiveCoverage::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LiveCoverage {
    Table,
    Id,
    Title,
    Slug,
    Subject,
    Context,
    ImageUrl,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LiveCoverageEditor {
    Table,
    CoverageId,
    EditorId,
    CreatedAt,
}

#[derive(Iden)]
enum LiveCoverageQuestion {
    Table,
    Id,
    CoverageId,
    Content,
    Timestamp,
    Status,
    Answered,
    UpdatedAt,
}

#[derive(Iden)]
enum LiveCoverageUpdate {
    Table,
    Id,
    CoverageId,
    AuthorId,
    Content,
    Timestamp,
    Important,
    Kind,
    ImageUrl,
    YoutubeUrl,
    ArticleId,
    ElectionResults,
    IsAnswer,
    QuestionId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}
