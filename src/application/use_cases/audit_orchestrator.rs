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

use crate::application::use_cases::finalizer::{
    FinalizeOutcome, Finalizer, ACTIVITY_CHANNEL, AUDIT_JOB,
};
use crate::config::settings::PipelineLimits;
use crate::domain::models::audit_run::AuditRun;
use crate::domain::models::site::Site;
use crate::domain::repositories::stores::AuditStores;
use crate::domain::services::sitemap_discovery::SitemapDiscovery;
use crate::utils::errors::AuditError;
use crate::utils::url_utils::{normalize_url, path_depth};
use crate::workers::batch_coordinator::{BatchCoordinator, BatchOutcome};
use metrics::counter;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// sitemap 候选数量相对 `crawl_limit` 的倍数，给深度和主机过滤留出余量
const SITEMAP_OVERSAMPLE: usize = 4;

/// 一次完整审计的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditReport {
    pub batch: BatchOutcome,
    pub finalize: FinalizeOutcome,
}

/// 审计编排器
///
/// 驱动一次运行的状态机：`queued -> running -> {completed, failed}`。
/// 启动阶段（种子URL、批次）受外层超时约束；收尾在超时之外执行，
/// 已完成的运行不会被超时覆盖为失败。
pub struct AuditOrchestrator {
    stores: AuditStores,
    sitemap: Arc<dyn SitemapDiscovery>,
    batch: Arc<BatchCoordinator>,
    finalizer: Arc<Finalizer>,
    limits: PipelineLimits,
}

impl AuditOrchestrator {
    pub fn new(
        stores: AuditStores,
        sitemap: Arc<dyn SitemapDiscovery>,
        batch: Arc<BatchCoordinator>,
        finalizer: Arc<Finalizer>,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            stores,
            sitemap,
            batch,
            finalizer,
            limits,
        }
    }

    /// 启动一次审计
    ///
    /// # 返回值
    ///
    /// * `Ok(AuditReport)` - 运行已完成
    /// * `Err(AuditError::InvalidState)` - 运行不在排队状态，未做任何处理
    /// * `Err(_)` - 运行已标记为失败
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn start(&self, run_id: Uuid) -> Result<AuditReport, AuditError> {
        let run = self
            .stores
            .runs
            .find_by_id(run_id)
            .await?
            .ok_or(AuditError::RunNotFound(run_id))?;

        if !self.stores.runs.mark_running(run_id).await? {
            return Err(AuditError::InvalidState {
                id: run_id,
                status: run.status.to_string(),
            });
        }

        counter!("audit_runs_started_total").increment(1);
        info!(crawl_limit = run.settings.crawl_limit, "Audit run started");
        self.log_started(&run).await;

        let budget = self.limits.outer_run_timeout;
        let batch = match timeout(budget, self.crawl(&run)).await {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                self.fail_run(&run, "setup", &e).await;
                return Err(e);
            }
            Err(_) => {
                let e = AuditError::Timeout(budget.as_secs());
                self.fail_run(&run, "timeout", &e).await;
                return Err(e);
            }
        };

        let finalize = self.finalizer.finalize(run_id).await?;
        Ok(AuditReport { batch, finalize })
    }

    /// 构建种子URL并执行批次
    async fn crawl(&self, run: &AuditRun) -> Result<BatchOutcome, AuditError> {
        if let Some(reason) = run.settings_error.as_deref() {
            return Err(AuditError::Setup(format!("invalid settings: {}", reason)));
        }
        run.settings
            .check()
            .map_err(|e| AuditError::Setup(format!("invalid settings: {}", e)))?;

        let site = self
            .stores
            .sites
            .find_by_id(run.site_id)
            .await?
            .ok_or(AuditError::SiteNotFound(run.site_id))?;

        let seeds = self.seed_urls(run, &site).await?;
        if seeds.is_empty() {
            return Err(AuditError::NoUrlsToCrawl);
        }

        info!(seeds = seeds.len(), "Dispatching batch");
        Ok(self
            .batch
            .run_batch(run.id, seeds, self.limits.concurrency_limit)
            .await)
    }

    /// 种子URL：站点首页在前，合并 sitemap 候选，过滤、去重后截断到 `crawl_limit`
    async fn seed_urls(&self, run: &AuditRun, site: &Site) -> Result<Vec<String>, AuditError> {
        let limit = run.settings.crawl_limit as usize;
        let home = normalize_url(&site.canonical_url, None);

        let mut seen = HashSet::new();
        let mut seeds = Vec::new();
        if let Some(home) = home.as_ref() {
            seen.insert(home.clone());
            seeds.push(home.clone());
        }

        if run.settings.include_sitemap {
            let start_url = home.as_deref().unwrap_or(site.canonical_url.as_str());
            let hint = home.as_deref().unwrap_or(site.host.as_str());
            let candidates = self
                .sitemap
                .discover(start_url, limit.saturating_mul(SITEMAP_OVERSAMPLE))
                .await
                .map_err(|e| AuditError::Setup(format!("Sitemap discovery failed: {}", e)))?;

            for candidate in candidates {
                let Some(url) = normalize_url(&candidate, Some(hint)) else {
                    continue;
                };
                if let Some(max_depth) = run.settings.max_depth {
                    if path_depth(&url) > max_depth as usize {
                        continue;
                    }
                }
                if seen.insert(url.clone()) {
                    seeds.push(url);
                }
            }
        }

        seeds.truncate(limit);
        Ok(seeds)
    }

    async fn log_started(&self, run: &AuditRun) {
        let user_id = self.site_user(run).await;
        if let Err(e) = self
            .stores
            .activity
            .log_activity(
                ACTIVITY_CHANNEL,
                "audit.started",
                "Audit started",
                user_id,
                Some(run.site_id),
                json!({ "run_ref": AuditRun::run_ref(run.id) }),
            )
            .await
        {
            warn!(error = %e, "Failed to log audit start");
        }
    }

    /// 启动阶段失败：写为失败并记录作业失败
    async fn fail_run(&self, run: &AuditRun, stage: &'static str, err: &AuditError) {
        let message = err.to_string();
        error!(stage, error = %message, "Audit run failed");
        counter!("audit_runs_failed_total", "stage" => stage).increment(1);

        if let Err(e) = self.stores.runs.mark_failed(run.id, &message).await {
            error!(error = %e, "Failed to mark run as failed");
        }

        let user_id = self.site_user(run).await;
        if let Err(e) = self
            .stores
            .activity
            .log_job_failure(
                ACTIVITY_CHANNEL,
                AUDIT_JOB,
                &message,
                Some(run.site_id),
                user_id,
                &AuditRun::run_ref(run.id),
                json!({ "run_id": run.id, "stage": stage }),
            )
            .await
        {
            error!(error = %e, "Failed to log audit failure");
        }
    }

    async fn site_user(&self, run: &AuditRun) -> Option<Uuid> {
        self.stores
            .sites
            .find_by_id(run.site_id)
            .await
            .ok()
            .flatten()
            .and_then(|s| s.user_id)
    }
}
