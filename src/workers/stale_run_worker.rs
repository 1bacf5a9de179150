// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::audit_run_repository::AuditRunRepository;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 写入被回收运行的错误信息
pub const INTERRUPTED_MESSAGE: &str = "Audit interrupted before completion";

/// 遗留运行回收工作器
///
/// 进程被中止时，正在执行的运行会停在 running。该工作器定期把
/// 开始时间超过 `stale_after` 的 running 运行标记为失败。
/// 第一次扫描在启动时立即进行。
pub struct StaleRunWorker {
    runs: Arc<dyn AuditRunRepository>,
    stale_after: Duration,
    interval: Duration,
}

impl StaleRunWorker {
    /// `stale_after` 应大于编排器的外层超时，否则会回收仍在执行的运行
    pub fn new(
        runs: Arc<dyn AuditRunRepository>,
        stale_after: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            runs,
            stale_after,
            interval,
        }
    }

    /// 执行一次扫描，返回被标记为失败的运行数量
    pub async fn sweep_once(&self) -> Result<u64, WorkerError> {
        let stale_after = chrono::Duration::from_std(self.stale_after)
            .map_err(|e| WorkerError::InternalError(format!("invalid stale_after: {}", e)))?;
        let cutoff = Utc::now() - stale_after;

        let count = self
            .runs
            .fail_stale_running(cutoff, INTERRUPTED_MESSAGE)
            .await?;
        if count > 0 {
            counter!("audit_runs_failed_total", "stage" => "interrupted").increment(count);
        }
        Ok(count)
    }
}

#[async_trait]
impl Worker for StaleRunWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Stale run worker started");

        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;

            match self.sweep_once().await {
                Ok(count) => {
                    if count > 0 {
                        info!("Failed {} interrupted audit runs", count);
                    }
                }
                Err(e) => {
                    error!("Failed to sweep interrupted audit runs: {}", e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "stale-run-worker"
    }
}
