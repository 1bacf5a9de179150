// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::audit_run_repository::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 活动日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    /// 频道，例如 `audits`
    pub channel: String,
    /// 级别：`info` 或 `error`
    pub level: String,
    /// 事件名，例如 `audit.completed`
    pub event: String,
    pub message: String,
    pub user_id: Option<Uuid>,
    pub domain_id: Option<Uuid>,
    /// 关联引用，例如 `audit:{run_id}`
    pub run_ref: Option<String>,
    pub tags: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        channel: impl Into<String>,
        level: impl Into<String>,
        event: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            level: level.into(),
            event: event.into(),
            message: message.into(),
            user_id: None,
            domain_id: None,
            run_ref: None,
            tags: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }
}

/// 活动日志仓库特质
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// 记录一条活动
    async fn log_activity(
        &self,
        channel: &str,
        event: &str,
        message: &str,
        user_id: Option<Uuid>,
        domain_id: Option<Uuid>,
        tags: serde_json::Value,
    ) -> Result<(), RepositoryError>;

    /// 记录一次作业失败
    ///
    /// 以 `{job_name}.failed` 为事件名、`error` 为级别写入，并带上 `run_ref` 便于关联
    #[allow(clippy::too_many_arguments)]
    async fn log_job_failure(
        &self,
        channel: &str,
        job_name: &str,
        error: &str,
        domain_id: Option<Uuid>,
        user_id: Option<Uuid>,
        run_ref: &str,
        tags: serde_json::Value,
    ) -> Result<(), RepositoryError>;

    /// 按关联引用查询活动，按时间先后排序
    async fn find_by_run_ref(&self, run_ref: &str) -> Result<Vec<ActivityEntry>, RepositoryError>;

    /// 按频道查询活动
    async fn find_by_channel(&self, channel: &str) -> Result<Vec<ActivityEntry>, RepositoryError>;
}
