// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::audit_run_repository::RepositoryError;
use crate::domain::models::issue::NewIssue;
use crate::domain::models::page_result::PageResult;
use async_trait::async_trait;
use uuid::Uuid;

/// 页面结果仓库特质
#[async_trait]
pub trait PageResultRepository: Send + Sync {
    /// 保存一个页面结果及其问题
    ///
    /// 在一个事务内完成：按 `(run_id, url)` 插入或更新页面，
    /// 删除该页面之前的问题并写入新问题，最后把 `issues_count` 设为新问题的数量。
    ///
    /// # 参数
    ///
    /// * `page` - 页面结果
    /// * `issues` - 规则对该页面产生的问题
    ///
    /// # 返回值
    ///
    /// * `Ok(PageResult)` - 持久化后的页面（ID 为库中已有记录的 ID）
    /// * `Err(RepositoryError)` - 事务失败，页面和问题都不会被部分写入
    async fn save_page(
        &self,
        page: &PageResult,
        issues: Vec<NewIssue>,
    ) -> Result<PageResult, RepositoryError>;

    /// 按URL排序返回运行的所有页面
    async fn find_by_run(&self, run_id: Uuid) -> Result<Vec<PageResult>, RepositoryError>;

    /// 统计运行的页面数量
    async fn count_by_run(&self, run_id: Uuid) -> Result<u64, RepositoryError>;
}
