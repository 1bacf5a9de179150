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

use crate::domain::repositories::activity_log_repository::{ActivityEntry, ActivityLogRepository};
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::infrastructure::database::entities::activity_log;
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 活动日志仓库实现
pub struct ActivityLogRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ActivityLogRepositoryImpl {
    /// 创建新的活动日志仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn insert(&self, entry: ActivityEntry) -> Result<(), RepositoryError> {
        let model = activity_log::ActiveModel {
            id: Set(entry.id),
            channel: Set(entry.channel),
            level: Set(entry.level),
            event: Set(entry.event),
            message: Set(entry.message),
            user_id: Set(entry.user_id),
            domain_id: Set(entry.domain_id),
            run_ref: Set(entry.run_ref),
            tags: Set(entry.tags),
            created_at: Set(entry.created_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }
}

impl From<activity_log::Model> for ActivityEntry {
    fn from(m: activity_log::Model) -> Self {
        Self {
            id: m.id,
            channel: m.channel,
            level: m.level,
            event: m.event,
            message: m.message,
            user_id: m.user_id,
            domain_id: m.domain_id,
            run_ref: m.run_ref,
            tags: m.tags,
            created_at: m.created_at.into(),
        }
    }
}

#[async_trait]
impl ActivityLogRepository for ActivityLogRepositoryImpl {
    async fn log_activity(
        &self,
        channel: &str,
        event: &str,
        message: &str,
        user_id: Option<Uuid>,
        domain_id: Option<Uuid>,
        tags: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let run_ref = tags
            .get("run_ref")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut entry = ActivityEntry::new(channel, "info", event, message);
        entry.user_id = user_id;
        entry.domain_id = domain_id;
        entry.run_ref = run_ref;
        entry.tags = tags;
        self.insert(entry).await
    }

    async fn log_job_failure(
        &self,
        channel: &str,
        job_name: &str,
        error: &str,
        domain_id: Option<Uuid>,
        user_id: Option<Uuid>,
        run_ref: &str,
        tags: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let mut entry = ActivityEntry::new(
            channel,
            "error",
            format!("{}.failed", job_name),
            error,
        );
        entry.user_id = user_id;
        entry.domain_id = domain_id;
        entry.run_ref = Some(run_ref.to_string());
        entry.tags = tags;
        self.insert(entry).await
    }

    async fn find_by_run_ref(&self, run_ref: &str) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let models = activity_log::Entity::find()
            .filter(activity_log::Column::RunRef.eq(run_ref))
            .order_by_asc(activity_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(ActivityEntry::from).collect())
    }

    async fn find_by_channel(&self, channel: &str) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let models = activity_log::Entity::find()
            .filter(activity_log::Column::Channel.eq(channel))
            .order_by_asc(activity_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(ActivityEntry::from).collect())
    }
}
