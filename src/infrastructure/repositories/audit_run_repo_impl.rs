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

use crate::domain::models::audit_run::{AuditRun, AuditSettings, AuditStatus, AuditSummary};
use crate::domain::repositories::audit_run_repository::{AuditRunRepository, RepositoryError};
use crate::infrastructure::database::entities::audit_run as audit_run_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use uuid::Uuid;

/// 审计运行仓库实现
///
/// 状态转换都是带状态过滤的 `UPDATE`，并发的调用者中只有一个会生效
pub struct AuditRunRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl AuditRunRepositoryImpl {
    /// 创建新的审计运行仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的审计运行仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let count = audit_run_entity::Entity::find_by_id(id)
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }
}

fn to_domain(m: audit_run_entity::Model) -> Result<AuditRun, RepositoryError> {
    let status: AuditStatus = m.status.parse().map_err(|_| {
        RepositoryError::Database(DbErr::Custom(format!(
            "Invalid audit status: {}",
            m.status
        )))
    })?;
    // Unreadable settings must not hide the run from the queue; the orchestrator fails it
    let (settings, settings_error) = match serde_json::from_value::<AuditSettings>(m.settings) {
        Ok(settings) => (settings, None),
        Err(e) => (AuditSettings::default(), Some(e.to_string())),
    };

    Ok(AuditRun {
        id: m.id,
        site_id: m.site_id,
        status,
        settings,
        settings_error,
        summary: AuditSummary {
            pages_crawled: m.pages_crawled.max(0) as u32,
            issues_critical: m.issues_critical.max(0) as u32,
            issues_warning: m.issues_warning.max(0) as u32,
            issues_info: m.issues_info.max(0) as u32,
        },
        health_score: m.health_score.map(|s| s.clamp(0, 100) as u8),
        error_message: m.error_message,
        started_at: m.started_at.map(Into::into),
        finished_at: m.finished_at.map(Into::into),
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    })
}

#[async_trait]
impl AuditRunRepository for AuditRunRepositoryImpl {
    async fn create(&self, run: &AuditRun) -> Result<AuditRun, RepositoryError> {
        let settings = serde_json::to_value(&run.settings)
            .map_err(|e| RepositoryError::Database(DbErr::Custom(e.to_string())))?;

        let model = audit_run_entity::ActiveModel {
            id: Set(run.id),
            site_id: Set(run.site_id),
            status: Set(run.status.to_string()),
            settings: Set(settings),
            started_at: Set(run.started_at.map(Into::into)),
            finished_at: Set(run.finished_at.map(Into::into)),
            pages_crawled: Set(run.summary.pages_crawled as i32),
            issues_critical: Set(run.summary.issues_critical as i32),
            issues_warning: Set(run.summary.issues_warning as i32),
            issues_info: Set(run.summary.issues_info as i32),
            health_score: Set(run.health_score.map(i32::from)),
            error_message: Set(run.error_message.clone()),
            created_at: Set(run.created_at.into()),
            updated_at: Set(run.updated_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(run.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditRun>, RepositoryError> {
        audit_run_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn find_next_queued(&self) -> Result<Option<AuditRun>, RepositoryError> {
        audit_run_entity::Entity::find()
            .filter(audit_run_entity::Column::Status.eq(AuditStatus::Queued.to_string()))
            .order_by_asc(audit_run_entity::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn mark_running(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let result = audit_run_entity::Entity::update_many()
            .col_expr(
                audit_run_entity::Column::Status,
                Expr::value(AuditStatus::Running.to_string()),
            )
            .col_expr(
                audit_run_entity::Column::StartedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now)),
            )
            .col_expr(audit_run_entity::Column::UpdatedAt, Expr::value(now))
            .filter(audit_run_entity::Column::Id.eq(id))
            .filter(audit_run_entity::Column::Status.eq(AuditStatus::Queued.to_string()))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 && !self.exists(id).await? {
            return Err(RepositoryError::NotFound);
        }
        Ok(result.rows_affected == 1)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        summary: AuditSummary,
        health_score: u8,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let result = audit_run_entity::Entity::update_many()
            .col_expr(
                audit_run_entity::Column::Status,
                Expr::value(AuditStatus::Completed.to_string()),
            )
            .col_expr(
                audit_run_entity::Column::PagesCrawled,
                Expr::value(summary.pages_crawled as i32),
            )
            .col_expr(
                audit_run_entity::Column::IssuesCritical,
                Expr::value(summary.issues_critical as i32),
            )
            .col_expr(
                audit_run_entity::Column::IssuesWarning,
                Expr::value(summary.issues_warning as i32),
            )
            .col_expr(
                audit_run_entity::Column::IssuesInfo,
                Expr::value(summary.issues_info as i32),
            )
            .col_expr(
                audit_run_entity::Column::HealthScore,
                Expr::value::<Option<i32>>(Some(i32::from(health_score))),
            )
            .col_expr(
                audit_run_entity::Column::ErrorMessage,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                audit_run_entity::Column::FinishedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now)),
            )
            .col_expr(audit_run_entity::Column::UpdatedAt, Expr::value(now))
            .filter(audit_run_entity::Column::Id.eq(id))
            .filter(audit_run_entity::Column::Status.is_in(vec![
                AuditStatus::Running.to_string(),
                AuditStatus::Completed.to_string(),
            ]))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            if !self.exists(id).await? {
                return Err(RepositoryError::NotFound);
            }
            return Err(RepositoryError::InvalidTransition {
                id,
                reason: "only running runs can be completed".to_string(),
            });
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<bool, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let result = audit_run_entity::Entity::update_many()
            .col_expr(
                audit_run_entity::Column::Status,
                Expr::value(AuditStatus::Failed.to_string()),
            )
            .col_expr(
                audit_run_entity::Column::ErrorMessage,
                Expr::value::<Option<String>>(Some(message.to_string())),
            )
            .col_expr(
                audit_run_entity::Column::HealthScore,
                Expr::value(Option::<i32>::None),
            )
            .col_expr(
                audit_run_entity::Column::FinishedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now)),
            )
            .col_expr(audit_run_entity::Column::UpdatedAt, Expr::value(now))
            .filter(audit_run_entity::Column::Id.eq(id))
            .filter(audit_run_entity::Column::Status.is_in(vec![
                AuditStatus::Queued.to_string(),
                AuditStatus::Running.to_string(),
            ]))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 && !self.exists(id).await? {
            return Err(RepositoryError::NotFound);
        }
        Ok(result.rows_affected == 1)
    }

    async fn fail_stale_running(
        &self,
        started_before: DateTime<Utc>,
        message: &str,
    ) -> Result<u64, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let cutoff: DateTime<FixedOffset> = started_before.into();

        let result = audit_run_entity::Entity::update_many()
            .col_expr(
                audit_run_entity::Column::Status,
                Expr::value(AuditStatus::Failed.to_string()),
            )
            .col_expr(
                audit_run_entity::Column::ErrorMessage,
                Expr::value::<Option<String>>(Some(message.to_string())),
            )
            .col_expr(
                audit_run_entity::Column::HealthScore,
                Expr::value(Option::<i32>::None),
            )
            .col_expr(
                audit_run_entity::Column::FinishedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(now)),
            )
            .col_expr(audit_run_entity::Column::UpdatedAt, Expr::value(now))
            .filter(audit_run_entity::Column::Status.eq(AuditStatus::Running.to_string()))
            .filter(audit_run_entity::Column::StartedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
