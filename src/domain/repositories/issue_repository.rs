// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::audit_run_repository::RepositoryError;
use crate::domain::models::issue::{Issue, SeverityCounts};
use async_trait::async_trait;
use uuid::Uuid;

/// 问题仓库特质
///
/// 问题只追加，没有自然去重键
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// 创建问题
    async fn create(&self, issue: &Issue) -> Result<Issue, RepositoryError>;

    /// 在同一个事务中创建一组问题，任一条失败时全部不写入
    async fn create_many(&self, issues: &[Issue]) -> Result<(), RepositoryError>;

    /// 按严重级别统计运行的问题数量
    async fn count_by_severity(&self, run_id: Uuid) -> Result<SeverityCounts, RepositoryError>;

    /// 运行中是否已存在指定类型的问题
    async fn exists_by_type(&self, run_id: Uuid, issue_type: &str)
        -> Result<bool, RepositoryError>;

    /// 返回运行的所有问题
    async fn find_by_run(&self, run_id: Uuid) -> Result<Vec<Issue>, RepositoryError>;
}
