// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::activity_log_repository::ActivityLogRepository;
use super::audit_run_repository::AuditRunRepository;
use super::enrichment_metric_repository::EnrichmentMetricRepository;
use super::issue_repository::IssueRepository;
use super::page_result_repository::PageResultRepository;
use super::quota_repository::QuotaRepository;
use super::site_repository::SiteRepository;
use std::sync::Arc;

/// 审计管道使用的全部仓库
///
/// 克隆只复制 `Arc`
#[derive(Clone)]
pub struct AuditStores {
    pub sites: Arc<dyn SiteRepository>,
    pub runs: Arc<dyn AuditRunRepository>,
    pub pages: Arc<dyn PageResultRepository>,
    pub issues: Arc<dyn IssueRepository>,
    pub metrics: Arc<dyn EnrichmentMetricRepository>,
    pub quota: Arc<dyn QuotaRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
}
