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

use siteaudit::application::use_cases::audit_orchestrator::AuditOrchestrator;
use siteaudit::application::use_cases::finalizer::Finalizer;
use siteaudit::config::settings::Settings;
use siteaudit::domain::services::issue_rules::DefaultIssueRules;
use siteaudit::engines::reqwest_engine::ReqwestFetcher;
use siteaudit::infrastructure::database::connection;
use siteaudit::infrastructure::metrics::init_metrics;
use siteaudit::infrastructure::pagespeed::PageSpeedClient;
use siteaudit::infrastructure::repositories::sea_orm_stores;
use siteaudit::infrastructure::sitemap::HttpSitemapDiscovery;
use siteaudit::queue::enrichment_queue::ChannelEnrichmentQueue;
use siteaudit::utils::telemetry;
use siteaudit::workers::batch_coordinator::BatchCoordinator;
use siteaudit::workers::manager::WorkerManager;
use siteaudit::workers::page_worker::PageWorker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 主函数
///
/// 加载配置、连接数据库并启动审计工作器，直到收到关闭信号
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Logging and metrics
    telemetry::init_telemetry(&settings.logging);
    info!("Starting siteaudit...");
    init_metrics(&settings.metrics);

    // 3. Database
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    let stores = sea_orm_stores(db);

    // 4. Collaborators
    let pipeline = &settings.pipeline;
    let limits = pipeline.limits();
    let fetcher = Arc::new(ReqwestFetcher::new(pipeline.fetcher_config())?);
    let sitemap = Arc::new(HttpSitemapDiscovery::new(
        &pipeline.user_agent,
        Duration::from_millis(pipeline.fetch_timeout_ms),
    )?);
    let pagespeed = Arc::new(PageSpeedClient::new(&settings.pagespeed)?);
    if !pagespeed.is_configured() {
        warn!("PageSpeed API key not configured, Core Web Vitals enrichment disabled");
    }
    let rules = Arc::new(DefaultIssueRules::new());
    let (queue, receiver) = ChannelEnrichmentQueue::new(settings.workers.enrichment_queue_capacity);

    // 5. Pipeline
    let page_worker = Arc::new(PageWorker::new(
        fetcher,
        rules.clone(),
        stores.pages.clone(),
        limits.page_timeout,
    ));
    let batch = Arc::new(BatchCoordinator::new(page_worker));
    let finalizer = Arc::new(Finalizer::new(stores.clone(), rules, Arc::new(queue)));
    let orchestrator = Arc::new(AuditOrchestrator::new(
        stores.clone(),
        sitemap,
        batch,
        finalizer,
        limits,
    ));

    // 6. Workers
    let mut manager = WorkerManager::new();
    manager.start_audit_workers(
        settings.workers.audit_workers,
        stores.runs.clone(),
        orchestrator,
        Duration::from_millis(settings.workers.poll_interval_ms),
    );
    manager.start_stale_run_sweeper(
        stores.runs.clone(),
        Duration::from_millis(settings.workers.stale_run_after_ms),
        Duration::from_millis(settings.workers.sweep_interval_ms),
    );
    manager.start_enrichment_workers(
        settings.workers.enrichment_workers,
        receiver,
        pagespeed,
        stores.metrics.clone(),
    );
    info!("siteaudit running with {} workers", manager.worker_count());

    manager.wait_for_shutdown().await;
    Ok(())
}
