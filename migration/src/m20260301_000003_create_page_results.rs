// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_audit_runs::AuditRuns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PageResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PageResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PageResults::RunId).uuid().not_null())
                    .col(ColumnDef::new(PageResults::Url).string().not_null())
                    .col(ColumnDef::new(PageResults::Path).string().not_null())
                    .col(ColumnDef::new(PageResults::StatusCode).integer().not_null())
                    .col(ColumnDef::new(PageResults::FinalUrl).string())
                    .col(ColumnDef::new(PageResults::ResponseTimeMs).big_integer())
                    .col(ColumnDef::new(PageResults::ContentType).string())
                    .col(ColumnDef::new(PageResults::Title).text())
                    .col(ColumnDef::new(PageResults::MetaDescription).text())
                    .col(ColumnDef::new(PageResults::Canonical).string())
                    .col(ColumnDef::new(PageResults::RobotsMeta).string())
                    .col(
                        ColumnDef::new(PageResults::H1Count)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PageResults::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PageResults::IsIndexable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PageResults::IssuesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PageResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PageResults::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_page_results_run")
                            .from(PageResults::Table, PageResults::RunId)
                            .to(AuditRuns::Table, AuditRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (run_id, url) is the natural key of a page result
        manager
            .create_index(
                Index::create()
                    .name("idx_page_results_run_url")
                    .table(PageResults::Table)
                    .col(PageResults::RunId)
                    .col(PageResults::Url)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PageResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PageResults {
    Table,
    Id,
    RunId,
    Url,
    Path,
    StatusCode,
    FinalUrl,
    ResponseTimeMs,
    ContentType,
    Title,
    MetaDescription,
    Canonical,
    RobotsMeta,
    H1Count,
    WordCount,
    IsIndexable,
    IssuesCount,
    CreatedAt,
    UpdatedAt,
}
