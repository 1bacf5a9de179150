// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrichment_metric::EnrichmentTask;
use metrics::counter;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::warn;

/// 补充数据任务队列特质
///
/// 入队不能阻塞调用者：收尾阶段在运行完成后才入队，
/// 补充数据的任何问题都不能影响运行结果
pub trait EnrichmentQueue: Send + Sync {
    /// 入队任务
    ///
    /// # 返回值
    ///
    /// 任务被接受时返回 `true`，队列已满或已关闭时返回 `false`
    fn enqueue(&self, task: EnrichmentTask) -> bool;
}

/// 基于有界 tokio mpsc 通道的队列
#[derive(Clone)]
pub struct ChannelEnrichmentQueue {
    sender: Sender<EnrichmentTask>,
}

impl ChannelEnrichmentQueue {
    /// 创建队列以及对应的接收端
    ///
    /// # 参数
    ///
    /// * `capacity` - 通道容量，至少为 1
    pub fn new(capacity: usize) -> (Self, Receiver<EnrichmentTask>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl EnrichmentQueue for ChannelEnrichmentQueue {
    fn enqueue(&self, task: EnrichmentTask) -> bool {
        match self.sender.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                warn!(run_id = %task.run_id, url = %task.url, strategy = %task.strategy, "Enrichment queue full, dropping task");
                counter!("audit_enrichment_total", "outcome" => "dropped").increment(1);
                false
            }
            Err(TrySendError::Closed(task)) => {
                warn!(run_id = %task.run_id, url = %task.url, "Enrichment queue closed, dropping task");
                counter!("audit_enrichment_total", "outcome" => "dropped").increment(1);
                false
            }
        }
    }
}
