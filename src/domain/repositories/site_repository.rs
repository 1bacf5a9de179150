// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::audit_run_repository::RepositoryError;
use crate::domain::models::site::Site;
use async_trait::async_trait;
use uuid::Uuid;

/// 站点仓库特质
///
/// 站点记录由外部系统维护，审计管道只按ID读取
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// 创建站点
    async fn create(&self, site: &Site) -> Result<Site, RepositoryError>;

    /// 根据ID查找站点
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, RepositoryError>;
}
