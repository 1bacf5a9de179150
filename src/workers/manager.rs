// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::audit_orchestrator::AuditOrchestrator;
use crate::domain::models::enrichment_metric::EnrichmentTask;
use crate::domain::repositories::audit_run_repository::AuditRunRepository;
use crate::domain::repositories::enrichment_metric_repository::EnrichmentMetricRepository;
use crate::domain::services::page_speed::PageSpeedProvider;
use crate::workers::audit_worker::AuditWorker;
use crate::workers::enrichment_worker::EnrichmentWorker;
use crate::workers::stale_run_worker::StaleRunWorker;
use crate::workers::worker::Worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc::Receiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 启动审计工作器和补充数据工作器，并在关闭时中止它们
#[derive(Default)]
pub struct WorkerManager {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在独立任务中运行一个工作器
    pub fn start_worker(&mut self, worker: Arc<dyn Worker>) {
        let handle = tokio::spawn(async move {
            let name = worker.name().to_string();
            match worker.run().await {
                Ok(()) => info!("Worker {} stopped", name),
                Err(e) => error!("Worker {} exited with error: {}", name, e),
            }
        });
        self.handles.push(handle);
    }

    /// 启动审计工作器
    ///
    /// # 参数
    ///
    /// * `count` - 工作器数量
    /// * `runs` - 审计运行仓库
    /// * `orchestrator` - 审计编排器
    /// * `poll_interval` - 没有排队运行时的轮询间隔
    pub fn start_audit_workers(
        &mut self,
        count: usize,
        runs: Arc<dyn AuditRunRepository>,
        orchestrator: Arc<AuditOrchestrator>,
        poll_interval: Duration,
    ) {
        for _ in 0..count {
            let worker = AuditWorker::new(runs.clone(), orchestrator.clone(), poll_interval);
            self.start_worker(Arc::new(worker));
        }
        info!("Started {} audit workers", count);
    }

    /// 启动补充数据工作器，所有工作器共享同一个接收端
    pub fn start_enrichment_workers(
        &mut self,
        count: usize,
        receiver: Receiver<EnrichmentTask>,
        provider: Arc<dyn PageSpeedProvider>,
        metrics: Arc<dyn EnrichmentMetricRepository>,
    ) {
        let receiver = Arc::new(Mutex::new(receiver));
        for _ in 0..count {
            let worker = EnrichmentWorker::new(receiver.clone(), provider.clone(), metrics.clone());
            self.start_worker(Arc::new(worker));
        }
        info!("Started {} enrichment workers", count);
    }

    /// 启动遗留运行回收工作器
    ///
    /// # 参数
    ///
    /// * `runs` - 审计运行仓库
    /// * `stale_after` - running 状态持续多久后视为中断
    /// * `interval` - 扫描间隔
    pub fn start_stale_run_sweeper(
        &mut self,
        runs: Arc<dyn AuditRunRepository>,
        stale_after: Duration,
        interval: Duration,
    ) {
        self.start_worker(Arc::new(StaleRunWorker::new(runs, stale_after, interval)));
        info!("Started stale run sweeper");
    }

    /// 正在管理的工作器任务数量
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 中止所有工作器
    ///
    /// 进行中的页面任务会被放弃；每个页面的写入是单独的事务。
    /// 被中止的运行停在 running，由下次启动时的回收工作器标记为失败
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown();
    }
}
