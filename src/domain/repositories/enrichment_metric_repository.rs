// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::audit_run_repository::RepositoryError;
use crate::domain::models::enrichment_metric::EnrichmentMetric;
use async_trait::async_trait;
use uuid::Uuid;

/// 补充指标仓库特质
#[async_trait]
pub trait EnrichmentMetricRepository: Send + Sync {
    /// 按 `(run_id, url, strategy)` 插入或更新指标
    async fn upsert(&self, metric: &EnrichmentMetric) -> Result<(), RepositoryError>;

    /// 返回运行的所有指标
    async fn find_by_run(&self, run_id: Uuid) -> Result<Vec<EnrichmentMetric>, RepositoryError>;
}
