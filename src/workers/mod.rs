// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 页面工作器与批次协调器完成一次运行内的并发抓取；
/// 审计、补充数据和遗留运行回收工作器是由 `WorkerManager` 管理的后台循环
pub mod audit_worker;
pub mod batch_coordinator;
pub mod enrichment_worker;
pub mod manager;
pub mod page_worker;
pub mod stale_run_worker;
pub mod worker;

pub use worker::Worker;
