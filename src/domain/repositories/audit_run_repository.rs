// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_run::{AuditRun, AuditSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 非法的状态转换
    #[error("Invalid transition for {id}: {reason}")]
    InvalidTransition {
        /// 记录ID
        id: Uuid,
        /// 原因
        reason: String,
    },
}

/// 审计运行仓库特质
///
/// 定义审计运行的数据访问接口。状态转换通过条件更新完成，
/// 数据库中的当前状态不满足前置条件时更新不会生效。
#[async_trait]
pub trait AuditRunRepository: Send + Sync {
    /// 创建审计运行
    ///
    /// # 参数
    ///
    /// * `run` - 要创建的审计运行，通常处于 queued 状态
    ///
    /// # 返回值
    ///
    /// * `Ok(AuditRun)` - 创建后的审计运行
    /// * `Err(RepositoryError)` - 创建失败
    async fn create(&self, run: &AuditRun) -> Result<AuditRun, RepositoryError>;

    /// 根据ID查找审计运行
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditRun>, RepositoryError>;

    /// 查找最早创建的排队中审计运行
    async fn find_next_queued(&self) -> Result<Option<AuditRun>, RepositoryError>;

    /// 将运行从 queued 转为 running 并记录开始时间
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 当前调用者获得了这次运行
    /// * `Ok(false)` - 运行已不在 queued 状态
    async fn mark_running(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// 将运行标记为完成，写入汇总、健康分数和结束时间
    ///
    /// 仅当运行处于 running 或 completed 时生效，否则返回 `InvalidTransition`
    async fn mark_completed(
        &self,
        id: Uuid,
        summary: AuditSummary,
        health_score: u8,
    ) -> Result<(), RepositoryError>;

    /// 将运行标记为失败，写入错误信息和结束时间
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 运行从 queued/running 转为 failed
    /// * `Ok(false)` - 运行已处于终态，未做修改
    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<bool, RepositoryError>;

    /// 将开始时间早于 `started_before` 且仍处于 running 的运行标记为失败
    ///
    /// 用于回收进程中止时遗留的运行，返回被修改的运行数量
    async fn fail_stale_running(
        &self,
        started_before: DateTime<Utc>,
        message: &str,
    ) -> Result<u64, RepositoryError>;
}
