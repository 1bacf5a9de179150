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

use crate::domain::models::enrichment_metric::{EnrichmentMetric, EnrichmentTask};
use crate::domain::repositories::enrichment_metric_repository::EnrichmentMetricRepository;
use crate::domain::services::page_speed::PageSpeedProvider;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// 补充数据处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Stored,
    Skipped,
    Failed,
}

impl EnrichmentOutcome {
    fn label(self) -> &'static str {
        match self {
            EnrichmentOutcome::Stored => "stored",
            EnrichmentOutcome::Skipped => "skipped",
            EnrichmentOutcome::Failed => "failed",
        }
    }
}

/// 补充数据工作器
///
/// 多个工作器共享同一个接收端。所有错误只记录日志和计数，
/// 不会影响对应运行的状态。
pub struct EnrichmentWorker {
    receiver: Arc<Mutex<Receiver<EnrichmentTask>>>,
    provider: Arc<dyn PageSpeedProvider>,
    metrics: Arc<dyn EnrichmentMetricRepository>,
}

impl EnrichmentWorker {
    pub fn new(
        receiver: Arc<Mutex<Receiver<EnrichmentTask>>>,
        provider: Arc<dyn PageSpeedProvider>,
        metrics: Arc<dyn EnrichmentMetricRepository>,
    ) -> Self {
        Self {
            receiver,
            provider,
            metrics,
        }
    }

    /// 处理一个补充数据任务
    #[instrument(skip(self, task), fields(run_id = %task.run_id, url = %task.url, strategy = %task.strategy))]
    pub async fn process(&self, task: EnrichmentTask) -> EnrichmentOutcome {
        let outcome = match self.provider.fetch_page_speed(&task.url, task.strategy).await {
            Ok(Some(metrics)) => {
                let metric = EnrichmentMetric::from_metrics(&task, metrics);
                match self.metrics.upsert(&metric).await {
                    Ok(()) => EnrichmentOutcome::Stored,
                    Err(e) => {
                        warn!(error = %e, "Failed to store PageSpeed metrics");
                        EnrichmentOutcome::Failed
                    }
                }
            }
            Ok(None) => {
                debug!("PageSpeed not configured, enrichment skipped");
                EnrichmentOutcome::Skipped
            }
            Err(e) => {
                warn!(error = %e, "PageSpeed request failed");
                EnrichmentOutcome::Failed
            }
        };

        counter!("audit_enrichment_total", "outcome" => outcome.label()).increment(1);
        outcome
    }
}

#[async_trait]
impl Worker for EnrichmentWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Enrichment worker started");

        loop {
            // Only hold the lock while waiting for the next task
            let next = { self.receiver.lock().await.recv().await };
            match next {
                Some(task) => {
                    self.process(task).await;
                }
                None => {
                    info!("Enrichment queue closed, worker exiting");
                    return Ok(());
                }
            }
        }
    }

    fn name(&self) -> &str {
        "enrichment-worker"
    }
}
