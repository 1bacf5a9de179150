// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// 后台工作器特质
///
/// `WorkerManager` 为每个实现启动一个 tokio 任务；
/// `run` 只在数据源关闭或遇到无法恢复的错误时返回
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行工作循环
    async fn run(&self) -> Result<(), WorkerError>;

    /// 工作器名称，用于日志
    fn name(&self) -> &str;
}
