// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::enrichment_metric::{EnrichmentMetric, Strategy};
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::enrichment_metric_repository::EnrichmentMetricRepository;
use crate::infrastructure::database::entities::enrichment_metric as metric_entity;
use async_trait::async_trait;
use sea_orm::{sea_query::OnConflict, *};
use std::sync::Arc;
use uuid::Uuid;

/// 补充指标仓库实现
pub struct EnrichmentMetricRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl EnrichmentMetricRepositoryImpl {
    /// 创建新的补充指标仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_domain(m: metric_entity::Model) -> Result<EnrichmentMetric, RepositoryError> {
    let strategy: Strategy = m.strategy.parse().map_err(|_| {
        RepositoryError::Database(DbErr::Custom(format!("Invalid strategy: {}", m.strategy)))
    })?;

    Ok(EnrichmentMetric {
        id: m.id,
        run_id: m.run_id,
        url: m.url,
        strategy,
        performance_score: m.performance_score,
        first_contentful_paint_ms: m.first_contentful_paint_ms,
        largest_contentful_paint_ms: m.largest_contentful_paint_ms,
        total_blocking_time_ms: m.total_blocking_time_ms,
        cumulative_layout_shift: m.cumulative_layout_shift,
        speed_index_ms: m.speed_index_ms,
        raw: m.raw,
        created_at: m.created_at.into(),
    })
}

#[async_trait]
impl EnrichmentMetricRepository for EnrichmentMetricRepositoryImpl {
    async fn upsert(&self, metric: &EnrichmentMetric) -> Result<(), RepositoryError> {
        let model = metric_entity::ActiveModel {
            id: Set(metric.id),
            run_id: Set(metric.run_id),
            url: Set(metric.url.clone()),
            strategy: Set(metric.strategy.to_string()),
            performance_score: Set(metric.performance_score),
            first_contentful_paint_ms: Set(metric.first_contentful_paint_ms),
            largest_contentful_paint_ms: Set(metric.largest_contentful_paint_ms),
            total_blocking_time_ms: Set(metric.total_blocking_time_ms),
            cumulative_layout_shift: Set(metric.cumulative_layout_shift),
            speed_index_ms: Set(metric.speed_index_ms),
            raw: Set(metric.raw.clone()),
            created_at: Set(metric.created_at.into()),
        };

        metric_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    metric_entity::Column::RunId,
                    metric_entity::Column::Url,
                    metric_entity::Column::Strategy,
                ])
                .update_columns([
                    metric_entity::Column::PerformanceScore,
                    metric_entity::Column::FirstContentfulPaintMs,
                    metric_entity::Column::LargestContentfulPaintMs,
                    metric_entity::Column::TotalBlockingTimeMs,
                    metric_entity::Column::CumulativeLayoutShift,
                    metric_entity::Column::SpeedIndexMs,
                    metric_entity::Column::Raw,
                    metric_entity::Column::CreatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn find_by_run(&self, run_id: Uuid) -> Result<Vec<EnrichmentMetric>, RepositoryError> {
        metric_entity::Entity::find()
            .filter(metric_entity::Column::RunId.eq(run_id))
            .order_by_asc(metric_entity::Column::Url)
            .order_by_asc(metric_entity::Column::Strategy)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}
