// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::audit_run_repository::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

/// 审计错误类型
///
/// 启动阶段和收尾阶段的错误都会导致运行失败；
/// 页面级错误和补充数据错误不会出现在这里
#[derive(Error, Debug)]
pub enum AuditError {
    /// 审计运行不存在
    #[error("Audit run {0} not found")]
    RunNotFound(Uuid),

    /// 站点不存在
    #[error("Site {0} not found")]
    SiteNotFound(Uuid),

    /// 种子URL集合为空
    #[error("No URLs to crawl")]
    NoUrlsToCrawl,

    /// 启动阶段失败
    #[error("Setup failed: {0}")]
    Setup(String),

    /// 收尾阶段失败
    #[error("Finalization failed: {0}")]
    Finalization(String),

    /// 外层超时
    #[error("Audit timed out after {0}s")]
    Timeout(u64),

    /// 运行状态不允许该操作
    #[error("Audit run {id} is {status}")]
    InvalidState {
        /// 运行ID
        id: Uuid,
        /// 当前状态
        status: String,
    },

    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("仓库错误: {0}")]
    RepositoryError(#[from] RepositoryError),

    #[error("审计错误: {0}")]
    AuditError(#[from] AuditError),

    #[error("内部错误: {0}")]
    InternalError(String),
}
