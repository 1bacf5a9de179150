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
                    .table(EnrichmentMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnrichmentMetrics::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnrichmentMetrics::RunId).uuid().not_null())
                    .col(ColumnDef::new(EnrichmentMetrics::Url).string().not_null())
                    .col(ColumnDef::new(EnrichmentMetrics::Strategy).string().not_null())
                    .col(ColumnDef::new(EnrichmentMetrics::PerformanceScore).double())
                    .col(ColumnDef::new(EnrichmentMetrics::FirstContentfulPaintMs).double())
                    .col(ColumnDef::new(EnrichmentMetrics::LargestContentfulPaintMs).double())
                    .col(ColumnDef::new(EnrichmentMetrics::TotalBlockingTimeMs).double())
                    .col(ColumnDef::new(EnrichmentMetrics::CumulativeLayoutShift).double())
                    .col(ColumnDef::new(EnrichmentMetrics::SpeedIndexMs).double())
                    .col(ColumnDef::new(EnrichmentMetrics::Raw).json().not_null())
                    .col(
                        ColumnDef::new(EnrichmentMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrichment_metrics_run")
                            .from(EnrichmentMetrics::Table, EnrichmentMetrics::RunId)
                            .to(AuditRuns::Table, AuditRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrichment_metrics_run_url_strategy")
                    .table(EnrichmentMetrics::Table)
                    .col(EnrichmentMetrics::RunId)
                    .col(EnrichmentMetrics::Url)
                    .col(EnrichmentMetrics::Strategy)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EnrichmentMetrics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EnrichmentMetrics {
    Table,
    Id,
    RunId,
    Url,
    Strategy,
    PerformanceScore,
    FirstContentfulPaintMs,
    LargestContentfulPaintMs,
    TotalBlockingTimeMs,
    CumulativeLayoutShift,
    SpeedIndexMs,
    Raw,
    CreatedAt,
}
