// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_audit_runs::AuditRuns;
use super::m20260301_000003_create_page_results::PageResults;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Issues::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Issues::RunId).uuid().not_null())
                    // Null for cross-page issues such as duplicate titles
                    .col(ColumnDef::new(Issues::PageId).uuid())
                    .col(ColumnDef::new(Issues::Severity).string().not_null())
                    .col(ColumnDef::new(Issues::IssueType).string().not_null())
                    .col(ColumnDef::new(Issues::Message).text().not_null())
                    .col(ColumnDef::new(Issues::Data).json().not_null())
                    .col(
                        ColumnDef::new(Issues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_run")
                            .from(Issues::Table, Issues::RunId)
                            .to(AuditRuns::Table, AuditRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_page")
                            .from(Issues::Table, Issues::PageId)
                            .to(PageResults::Table, PageResults::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issues_run_severity")
                    .table(Issues::Table)
                    .col(Issues::RunId)
                    .col(Issues::Severity)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Issues {
    Table,
    Id,
    RunId,
    PageId,
    Severity,
    IssueType,
    Message,
    Data,
    CreatedAt,
}
