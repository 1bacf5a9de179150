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

use crate::domain::models::issue::{Issue, Severity, SeverityCounts};
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::issue_repository::IssueRepository;
use crate::infrastructure::database::entities::issue as issue_entity;
use async_trait::async_trait;
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 问题仓库实现
pub struct IssueRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl IssueRepositoryImpl {
    /// 创建新的问题仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_active(issue: &Issue) -> issue_entity::ActiveModel {
    issue_entity::ActiveModel {
        id: Set(issue.id),
        run_id: Set(issue.run_id),
        page_id: Set(issue.page_id),
        severity: Set(issue.severity.to_string()),
        issue_type: Set(issue.issue_type.clone()),
        message: Set(issue.message.clone()),
        data: Set(issue.data.clone()),
        created_at: Set(issue.created_at.into()),
    }
}

fn to_domain(m: issue_entity::Model) -> Result<Issue, RepositoryError> {
    let severity: Severity = m.severity.parse().map_err(|_| {
        RepositoryError::Database(DbErr::Custom(format!(
            "Invalid issue severity: {}",
            m.severity
        )))
    })?;

    Ok(Issue {
        id: m.id,
        run_id: m.run_id,
        page_id: m.page_id,
        severity,
        issue_type: m.issue_type,
        message: m.message,
        data: m.data,
        created_at: m.created_at.into(),
    })
}

#[async_trait]
impl IssueRepository for IssueRepositoryImpl {
    async fn create(&self, issue: &Issue) -> Result<Issue, RepositoryError> {
        to_active(issue).insert(self.db.as_ref()).await?;
        Ok(issue.clone())
    }

    async fn create_many(&self, issues: &[Issue]) -> Result<(), RepositoryError> {
        if issues.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for issue in issues {
            to_active(issue).insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn count_by_severity(&self, run_id: Uuid) -> Result<SeverityCounts, RepositoryError> {
        let rows: Vec<(String, i64)> = issue_entity::Entity::find()
            .select_only()
            .column(issue_entity::Column::Severity)
            .column_as(Expr::col(issue_entity::Column::Id).count(), "count")
            .filter(issue_entity::Column::RunId.eq(run_id))
            .group_by(issue_entity::Column::Severity)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        let mut counts = SeverityCounts::default();
        for (severity, count) in rows {
            match severity.parse::<Severity>() {
                Ok(severity) => counts.add(severity, count.max(0) as u32),
                Err(_) => warn!(%run_id, severity, "Ignoring issues with unknown severity"),
            }
        }
        Ok(counts)
    }

    async fn exists_by_type(
        &self,
        run_id: Uuid,
        issue_type: &str,
    ) -> Result<bool, RepositoryError> {
        let count = issue_entity::Entity::find()
            .filter(issue_entity::Column::RunId.eq(run_id))
            .filter(issue_entity::Column::IssueType.eq(issue_type))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn find_by_run(&self, run_id: Uuid) -> Result<Vec<Issue>, RepositoryError> {
        issue_entity::Entity::find()
            .filter(issue_entity::Column::RunId.eq(run_id))
            .order_by_asc(issue_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}
