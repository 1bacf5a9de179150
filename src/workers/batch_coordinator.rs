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

use crate::workers::page_worker::{PageOutcome, PageWorker};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// 一批页面任务的最终计数
///
/// `succeeded + failed == total` 对任何交错顺序都成立
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Succeeded => self.succeeded += 1,
            PageOutcome::Failed => self.failed += 1,
        }
    }
}

/// 批次协调器
///
/// 固定宽度的任务池从URL队列中取任务，每个URL只交给一个页面工作器处理。
/// 所有任务结束后 `run_batch` 返回一次最终计数；单个任务失败或 panic
/// 只计入失败数，不影响其余任务。
pub struct BatchCoordinator {
    worker: Arc<PageWorker>,
}

impl BatchCoordinator {
    pub fn new(worker: Arc<PageWorker>) -> Self {
        Self { worker }
    }

    /// 并发处理一批URL
    ///
    /// 返回的 future 被丢弃时，仍在执行的任务会被中止；
    /// 每个页面的持久化是单独的事务，不会留下写了一半的记录。
    ///
    /// # 参数
    ///
    /// * `run_id` - 审计运行ID
    /// * `urls` - 种子URL
    /// * `concurrency_limit` - 同时执行的任务上限，至少为 1
    ///
    /// # 返回值
    ///
    /// 本批次的最终计数
    #[instrument(skip(self, urls), fields(run_id = %run_id, total = urls.len()))]
    pub async fn run_batch(
        &self,
        run_id: Uuid,
        urls: Vec<String>,
        concurrency_limit: usize,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            total: urls.len(),
            ..Default::default()
        };

        let mut queue = urls.into_iter();
        let mut set = JoinSet::new();

        for url in queue.by_ref().take(concurrency_limit.max(1)) {
            self.spawn_page(&mut set, run_id, url);
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(page) => outcome.record(page),
                Err(e) => {
                    error!(error = %e, "Page task aborted");
                    outcome.record(PageOutcome::Failed);
                }
            }

            if let Some(url) = queue.next() {
                self.spawn_page(&mut set, run_id, url);
            }
        }

        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "Batch finished"
        );
        outcome
    }

    fn spawn_page(&self, set: &mut JoinSet<PageOutcome>, run_id: Uuid, url: String) {
        let worker = self.worker.clone();
        set.spawn(async move { worker.process(run_id, &url).await });
    }
}

#[cfg(test)]
#[path = "batch_coordinator_test.rs"]
mod tests;
