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

use crate::domain::models::issue::NewIssue;
use crate::domain::models::page_result::PageResult;
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::page_result_repository::PageResultRepository;
use crate::infrastructure::database::entities::{issue as issue_entity, page_result as page_entity};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 页面结果仓库实现
pub struct PageResultRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl PageResultRepositoryImpl {
    /// 创建新的页面结果仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的页面结果仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<page_entity::Model> for PageResult {
    fn from(m: page_entity::Model) -> Self {
        Self {
            id: m.id,
            run_id: m.run_id,
            url: m.url,
            path: m.path,
            status_code: u16::try_from(m.status_code).unwrap_or(0),
            final_url: m.final_url,
            response_time_ms: m.response_time_ms.map(|ms| ms.max(0) as u64),
            content_type: m.content_type,
            title: m.title,
            meta_description: m.meta_description,
            canonical: m.canonical,
            robots_meta: m.robots_meta,
            h1_count: m.h1_count.max(0) as u32,
            word_count: m.word_count.max(0) as u32,
            is_indexable: m.is_indexable,
            issues_count: m.issues_count.max(0) as u32,
            created_at: m.created_at.into(),
            updated_at: m.updated_at.into(),
        }
    }
}

fn to_active(
    page: &PageResult,
    id: Uuid,
    issues_count: u32,
    created_at: DateTime<FixedOffset>,
    updated_at: DateTime<FixedOffset>,
) -> page_entity::ActiveModel {
    page_entity::ActiveModel {
        id: Set(id),
        run_id: Set(page.run_id),
        url: Set(page.url.clone()),
        path: Set(page.path.clone()),
        status_code: Set(i32::from(page.status_code)),
        final_url: Set(page.final_url.clone()),
        response_time_ms: Set(page.response_time_ms.map(|ms| ms as i64)),
        content_type: Set(page.content_type.clone()),
        title: Set(page.title.clone()),
        meta_description: Set(page.meta_description.clone()),
        canonical: Set(page.canonical.clone()),
        robots_meta: Set(page.robots_meta.clone()),
        h1_count: Set(page.h1_count as i32),
        word_count: Set(page.word_count as i32),
        is_indexable: Set(page.is_indexable),
        issues_count: Set(issues_count as i32),
        created_at: Set(created_at),
        updated_at: Set(updated_at),
    }
}

#[async_trait]
impl PageResultRepository for PageResultRepositoryImpl {
    async fn save_page(
        &self,
        page: &PageResult,
        issues: Vec<NewIssue>,
    ) -> Result<PageResult, RepositoryError> {
        let issues_count = issues.len() as u32;
        let now: DateTime<FixedOffset> = Utc::now().into();

        let txn = self.db.begin().await?;

        let existing = page_entity::Entity::find()
            .filter(page_entity::Column::RunId.eq(page.run_id))
            .filter(page_entity::Column::Url.eq(page.url.as_str()))
            .one(&txn)
            .await?;

        let (page_id, created_at) = match existing {
            Some(current) => {
                // Superseding write for the same (run, url): keep the row, replace its issues
                issue_entity::Entity::delete_many()
                    .filter(issue_entity::Column::PageId.eq(current.id))
                    .exec(&txn)
                    .await?;
                to_active(page, current.id, issues_count, current.created_at, now)
                    .update(&txn)
                    .await?;
                (current.id, current.created_at)
            }
            None => {
                let created_at: DateTime<FixedOffset> = page.created_at.into();
                to_active(page, page.id, issues_count, created_at, now)
                    .insert(&txn)
                    .await?;
                (page.id, created_at)
            }
        };

        for issue in issues {
            let model = issue_entity::ActiveModel {
                id: Set(Uuid::new_v4()),
                run_id: Set(page.run_id),
                page_id: Set(Some(page_id)),
                severity: Set(issue.severity.to_string()),
                issue_type: Set(issue.issue_type),
                message: Set(issue.message),
                data: Set(issue.data),
                created_at: Set(now),
            };
            model.insert(&txn).await?;
        }

        txn.commit().await?;

        Ok(PageResult {
            id: page_id,
            issues_count,
            created_at: created_at.into(),
            updated_at: now.into(),
            ..page.clone()
        })
    }

    async fn find_by_run(&self, run_id: Uuid) -> Result<Vec<PageResult>, RepositoryError> {
        let models = page_entity::Entity::find()
            .filter(page_entity::Column::RunId.eq(run_id))
            .order_by_asc(page_entity::Column::Url)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(PageResult::from).collect())
    }

    async fn count_by_run(&self, run_id: Uuid) -> Result<u64, RepositoryError> {
        let count = page_entity::Entity::find()
            .filter(page_entity::Column::RunId.eq(run_id))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
