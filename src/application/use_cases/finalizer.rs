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

use crate::domain::models::audit_run::{AuditRun, AuditSummary};
use crate::domain::models::enrichment_metric::{EnrichmentTask, Strategy};
use crate::domain::models::issue::Issue;
use crate::domain::models::page_result::PageResult;
use crate::domain::models::site::Site;
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::stores::AuditStores;
use crate::domain::services::health_score::health_score;
use crate::domain::services::issue_rules::{IssueRules, DUPLICATE_TITLE};
use crate::queue::enrichment_queue::EnrichmentQueue;
use crate::utils::errors::AuditError;
use crate::utils::url_utils::normalize_url;
use chrono::Utc;
use metrics::{counter, gauge};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 活动日志频道
pub const ACTIVITY_CHANNEL: &str = "audits";
/// 失败记录使用的作业名
pub const AUDIT_JOB: &str = "audit";
/// 配额计量项
pub const PAGES_CRAWLED_METER: &str = "pages_crawled";
/// 最多获取 Core Web Vitals 的页面数
pub const CWV_PAGE_LIMIT: usize = 6;

/// 收尾结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub summary: AuditSummary,
    pub health_score: u8,
    /// 实际入队的补充数据任务数
    pub enrichment_tasks: usize,
}

/// 收尾阶段
///
/// 汇总、评分并把运行写为完成。前四步任何一步失败都会让运行失败，
/// 之后的补充数据入队、配额消耗和活动记录各自独立，失败只记录日志。
pub struct Finalizer {
    stores: AuditStores,
    rules: Arc<dyn IssueRules>,
    enrichment: Arc<dyn EnrichmentQueue>,
}

impl Finalizer {
    pub fn new(
        stores: AuditStores,
        rules: Arc<dyn IssueRules>,
        enrichment: Arc<dyn EnrichmentQueue>,
    ) -> Self {
        Self {
            stores,
            rules,
            enrichment,
        }
    }

    /// 收尾一次运行
    ///
    /// # 返回值
    ///
    /// * `Ok(FinalizeOutcome)` - 运行已标记为完成
    /// * `Err(AuditError::Finalization)` - 汇总或持久化失败，运行已标记为失败
    /// * `Err(AuditError::RunNotFound)` - 运行不存在
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn finalize(&self, run_id: Uuid) -> Result<FinalizeOutcome, AuditError> {
        let run = self
            .stores
            .runs
            .find_by_id(run_id)
            .await?
            .ok_or(AuditError::RunNotFound(run_id))?;

        let (summary, score) = match self.score_run(&run).await {
            Ok(scored) => scored,
            Err(e) => {
                let err = AuditError::Finalization(e.to_string());
                self.record_failure(&run, &err).await;
                return Err(err);
            }
        };

        counter!("audit_runs_completed_total").increment(1);
        gauge!("audit_health_score").set(score as f64);
        info!(
            pages_crawled = summary.pages_crawled,
            critical = summary.issues_critical,
            warning = summary.issues_warning,
            info = summary.issues_info,
            health_score = score,
            "Audit run completed"
        );

        let site = match self.stores.sites.find_by_id(run.site_id).await {
            Ok(site) => site,
            Err(e) => {
                warn!(error = %e, "Failed to load site for post-completion steps");
                None
            }
        };

        let enrichment_tasks = if run.settings.include_cwv {
            self.enqueue_enrichment(&run, site.as_ref()).await
        } else {
            0
        };

        if let Some(site) = site.as_ref() {
            self.consume_quota(&run, site, summary.pages_crawled).await;
        } else {
            warn!(site_id = %run.site_id, "Site missing, skipping quota consumption");
        }

        self.log_completion(&run, site.as_ref(), &summary, score)
            .await;

        Ok(FinalizeOutcome {
            summary,
            health_score: score,
            enrichment_tasks,
        })
    }

    /// 汇总、跨页面检查、评分并写为完成
    async fn score_run(&self, run: &AuditRun) -> Result<(AuditSummary, u8), RepositoryError> {
        let pages_crawled = self.stores.pages.count_by_run(run.id).await?;
        let mut counts = self.stores.issues.count_by_severity(run.id).await?;

        // A completed run being finalized again already holds its cross-page issues
        if !self
            .stores
            .issues
            .exists_by_type(run.id, DUPLICATE_TITLE)
            .await?
        {
            let pages = self.stores.pages.find_by_run(run.id).await?;
            let issues: Vec<Issue> = self
                .rules
                .check_cross_page_duplicates(&pages)
                .into_iter()
                .map(|issue| Issue::from_new(run.id, None, issue))
                .collect();
            self.stores.issues.create_many(&issues).await?;
            for issue in &issues {
                counts.add(issue.severity, 1);
            }
        }

        let score = health_score(&counts);
        let summary = AuditSummary {
            pages_crawled: u32::try_from(pages_crawled).unwrap_or(u32::MAX),
            issues_critical: counts.critical,
            issues_warning: counts.warning,
            issues_info: counts.info,
        };

        self.stores
            .runs
            .mark_completed(run.id, summary, score)
            .await?;
        Ok((summary, score))
    }

    async fn record_failure(&self, run: &AuditRun, err: &AuditError) {
        let message = err.to_string();
        error!(error = %message, "Finalization failed");
        counter!("audit_runs_failed_total", "stage" => "finalize").increment(1);

        if let Err(e) = self.stores.runs.mark_failed(run.id, &message).await {
            error!(error = %e, "Failed to mark run as failed");
        }

        let user_id = match self.stores.sites.find_by_id(run.site_id).await {
            Ok(site) => site.and_then(|s| s.user_id),
            Err(_) => None,
        };
        let run_ref = AuditRun::run_ref(run.id);
        if let Err(e) = self
            .stores
            .activity
            .log_job_failure(
                ACTIVITY_CHANNEL,
                AUDIT_JOB,
                &message,
                Some(run.site_id),
                user_id,
                &run_ref,
                json!({ "run_id": run.id, "stage": "finalize" }),
            )
            .await
        {
            error!(error = %e, "Failed to log finalization failure");
        }
    }

    async fn enqueue_enrichment(&self, run: &AuditRun, site: Option<&Site>) -> usize {
        let pages = match self.stores.pages.find_by_run(run.id).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(error = %e, "Failed to load pages for enrichment");
                return 0;
            }
        };

        let home = site.and_then(|s| normalize_url(&s.canonical_url, None));
        let mut enqueued = 0;
        for url in select_cwv_pages(&pages, home.as_deref()) {
            for strategy in Strategy::ALL {
                let task = EnrichmentTask {
                    run_id: run.id,
                    url: url.clone(),
                    strategy,
                };
                if self.enrichment.enqueue(task) {
                    enqueued += 1;
                }
            }
        }

        info!(tasks = enqueued, "Enrichment tasks enqueued");
        enqueued
    }

    async fn consume_quota(&self, run: &AuditRun, site: &Site, pages_crawled: u32) {
        let period = Utc::now().format("%Y-%m").to_string();
        if let Err(e) = self
            .stores
            .quota
            .consume(
                site.account_id,
                PAGES_CRAWLED_METER,
                pages_crawled as u64,
                &period,
                json!({ "run_id": run.id, "domain_id": site.id }),
            )
            .await
        {
            warn!(error = %e, "Failed to consume quota");
        }
    }

    async fn log_completion(
        &self,
        run: &AuditRun,
        site: Option<&Site>,
        summary: &AuditSummary,
        score: u8,
    ) {
        let message = format!(
            "Audit completed: {} pages crawled, health score {}",
            summary.pages_crawled, score
        );
        if let Err(e) = self
            .stores
            .activity
            .log_activity(
                ACTIVITY_CHANNEL,
                "audit.completed",
                &message,
                site.and_then(|s| s.user_id),
                Some(run.site_id),
                json!({
                    "run_ref": AuditRun::run_ref(run.id),
                    "pages_crawled": summary.pages_crawled,
                    "health_score": score,
                }),
            )
            .await
        {
            warn!(error = %e, "Failed to log audit completion");
        }
    }
}

/// 选择获取 Core Web Vitals 的页面
///
/// 只考虑状态码 200 的页面；首页（站点 canonical URL 或路径 `/`）排在最前，
/// 其余按URL升序，最多 `CWV_PAGE_LIMIT` 个。
pub fn select_cwv_pages(pages: &[PageResult], home_url: Option<&str>) -> Vec<String> {
    let is_home = |page: &PageResult| home_url == Some(page.url.as_str()) || page.path == "/";

    let mut candidates: Vec<&PageResult> = pages.iter().filter(|p| p.status_code == 200).collect();
    candidates.sort_by(|a, b| {
        is_home(b)
            .cmp(&is_home(a))
            .then_with(|| a.url.cmp(&b.url))
    });

    candidates
        .into_iter()
        .take(CWV_PAGE_LIMIT)
        .map(|p| p.url.clone())
        .collect()
}
