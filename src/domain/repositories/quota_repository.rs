// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::audit_run_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 配额计量仓库特质
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    /// 记录一次配额消耗
    ///
    /// # 参数
    ///
    /// * `account_id` - 账户ID
    /// * `meter_key` - 计量项，例如 `pages_crawled`
    /// * `amount` - 消耗数量
    /// * `period` - 计量周期，格式 `YYYY-MM`
    /// * `tags` - 关联标签（运行ID、站点ID）
    async fn consume(
        &self,
        account_id: Uuid,
        meter_key: &str,
        amount: u64,
        period: &str,
        tags: serde_json::Value,
    ) -> Result<(), RepositoryError>;

    /// 统计账户在某个周期内的消耗总量
    async fn total_for_period(
        &self,
        account_id: Uuid,
        meter_key: &str,
        period: &str,
    ) -> Result<u64, RepositoryError>;
}
