// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 配额使用与活动日志表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. quota_usage (append-only ledger)
        manager
            .create_table(
                Table::create()
                    .table(QuotaUsage::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QuotaUsage::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(QuotaUsage::AccountId).uuid().not_null())
                    .col(ColumnDef::new(QuotaUsage::MeterKey).string().not_null())
                    .col(ColumnDef::new(QuotaUsage::Period).string().not_null())
                    .col(ColumnDef::new(QuotaUsage::Amount).big_integer().not_null())
                    .col(ColumnDef::new(QuotaUsage::Tags).json().not_null())
                    .col(
                        ColumnDef::new(QuotaUsage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quota_usage_account_meter_period")
                    .table(QuotaUsage::Table)
                    .col(QuotaUsage::AccountId)
                    .col(QuotaUsage::MeterKey)
                    .col(QuotaUsage::Period)
                    .to_owned(),
            )
            .await?;

        // 2. activity_logs
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLogs::Channel).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::Level).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::Event).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::Message).text().not_null())
                    .col(ColumnDef::new(ActivityLogs::UserId).uuid())
                    .col(ColumnDef::new(ActivityLogs::DomainId).uuid())
                    .col(ColumnDef::new(ActivityLogs::RunRef).string())
                    .col(ColumnDef::new(ActivityLogs::Tags).json().not_null())
                    .col(
                        ColumnDef::new(ActivityLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_run_ref")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::RunRef)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuotaUsage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum QuotaUsage {
    Table,
    Id,
    AccountId,
    MeterKey,
    Period,
    Amount,
    Tags,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ActivityLogs {
    Table,
    Id,
    Channel,
    Level,
    Event,
    Message,
    UserId,
    DomainId,
    RunRef,
    Tags,
    CreatedAt,
}
