// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_sites::Sites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditRuns::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditRuns::SiteId).uuid().not_null())
                    .col(ColumnDef::new(AuditRuns::Status).string().not_null())
                    .col(ColumnDef::new(AuditRuns::Settings).json().not_null())
                    .col(ColumnDef::new(AuditRuns::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AuditRuns::FinishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(AuditRuns::PagesCrawled)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRuns::IssuesCritical)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRuns::IssuesWarning)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRuns::IssuesInfo)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AuditRuns::HealthScore).integer())
                    .col(ColumnDef::new(AuditRuns::ErrorMessage).text())
                    .col(
                        ColumnDef::new(AuditRuns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AuditRuns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_runs_site")
                            .from(AuditRuns::Table, AuditRuns::SiteId)
                            .to(Sites::Table, Sites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Audit workers poll queued runs in creation order
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_runs_status_created")
                    .table(AuditRuns::Table)
                    .col(AuditRuns::Status)
                    .col(AuditRuns::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AuditRuns {
    Table,
    Id,
    SiteId,
    Status,
    Settings,
    StartedAt,
    FinishedAt,
    PagesCrawled,
    IssuesCritical,
    IssuesWarning,
    IssuesInfo,
    HealthScore,
    ErrorMessage,
    CreatedAt,
    UpdatedAt,
}
