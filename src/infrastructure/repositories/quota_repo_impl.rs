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

use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::quota_repository::QuotaRepository;
use crate::infrastructure::database::entities::quota_usage;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 配额仓库实现
///
/// 每次消耗追加一行，总量在读取时汇总
pub struct QuotaRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl QuotaRepositoryImpl {
    /// 创建新的配额仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuotaRepository for QuotaRepositoryImpl {
    async fn consume(
        &self,
        account_id: Uuid,
        meter_key: &str,
        amount: u64,
        period: &str,
        tags: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let model = quota_usage::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            meter_key: Set(meter_key.to_string()),
            period: Set(period.to_string()),
            amount: Set(i64::try_from(amount).unwrap_or(i64::MAX)),
            tags: Set(tags),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn total_for_period(
        &self,
        account_id: Uuid,
        meter_key: &str,
        period: &str,
    ) -> Result<u64, RepositoryError> {
        let rows = quota_usage::Entity::find()
            .filter(quota_usage::Column::AccountId.eq(account_id))
            .filter(quota_usage::Column::MeterKey.eq(meter_key))
            .filter(quota_usage::Column::Period.eq(period))
            .all(self.db.as_ref())
            .await?;

        Ok(rows.iter().map(|r| r.amount.max(0) as u64).sum())
    }
}
