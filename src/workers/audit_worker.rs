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

use crate::application::use_cases::audit_orchestrator::AuditOrchestrator;
use crate::domain::repositories::audit_run_repository::AuditRunRepository;
use crate::utils::errors::{AuditError, WorkerError};
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 审计工作器
///
/// 轮询排队中的运行并交给编排器执行。多个工作器可以同时轮询，
/// 同一个运行只会被 `mark_running` 成功的那一个处理。
pub struct AuditWorker {
    runs: Arc<dyn AuditRunRepository>,
    orchestrator: Arc<AuditOrchestrator>,
    poll_interval: Duration,
    worker_id: Uuid,
}

impl AuditWorker {
    pub fn new(
        runs: Arc<dyn AuditRunRepository>,
        orchestrator: Arc<AuditOrchestrator>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            runs,
            orchestrator,
            poll_interval,
            worker_id: Uuid::new_v4(),
        }
    }

    /// 处理下一个排队中的运行
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 取到了一个运行（无论其最终成功或失败）
    /// * `Ok(false)` - 没有排队中的运行
    pub async fn poll_once(&self) -> Result<bool, WorkerError> {
        let Some(run) = self.runs.find_next_queued().await? else {
            return Ok(false);
        };

        match self.orchestrator.start(run.id).await {
            Ok(report) => info!(
                run_id = %run.id,
                pages = report.batch.total,
                failed_pages = report.batch.failed,
                health_score = report.finalize.health_score,
                "Audit finished"
            ),
            Err(AuditError::InvalidState { .. }) => {
                debug!(run_id = %run.id, "Run claimed by another worker");
            }
            Err(e) => warn!(run_id = %run.id, error = %e, "Audit failed"),
        }
        Ok(true)
    }
}

#[async_trait]
impl Worker for AuditWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Audit worker {} started", self.worker_id);

        loop {
            match self.poll_once().await {
                Ok(true) => {}
                Ok(false) => sleep(self.poll_interval).await,
                Err(e) => {
                    error!("Error polling audit runs: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "audit-worker"
    }
}
