// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口基于 sea-orm 的具体实现
pub mod activity_log_repo_impl;
pub mod audit_run_repo_impl;
pub mod enrichment_metric_repo_impl;
pub mod issue_repo_impl;
pub mod page_result_repo_impl;
pub mod quota_repo_impl;
pub mod site_repo_impl;

use crate::domain::repositories::stores::AuditStores;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 基于同一个数据库连接创建全部仓库
pub fn sea_orm_stores(db: Arc<DatabaseConnection>) -> AuditStores {
    AuditStores {
        sites: Arc::new(site_repo_impl::SiteRepositoryImpl::new(db.clone())),
        runs: Arc::new(audit_run_repo_impl::AuditRunRepositoryImpl::new(db.clone())),
        pages: Arc::new(page_result_repo_impl::PageResultRepositoryImpl::new(db.clone())),
        issues: Arc::new(issue_repo_impl::IssueRepositoryImpl::new(db.clone())),
        metrics: Arc::new(enrichment_metric_repo_impl::EnrichmentMetricRepositoryImpl::new(
            db.clone(),
        )),
        quota: Arc::new(quota_repo_impl::QuotaRepositoryImpl::new(db.clone())),
        activity: Arc::new(activity_log_repo_impl::ActivityLogRepositoryImpl::new(db)),
    }
}
