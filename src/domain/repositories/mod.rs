// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod activity_log_repository;
/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层基于 sea-orm 提供。
///
/// 包含的仓库接口：
/// - 审计运行仓库（audit_run_repository）：运行的创建与状态转换
/// - 页面结果仓库（page_result_repository）：按 (run, url) 原子写入页面和问题
/// - 问题仓库（issue_repository）：问题的追加与按级别统计
/// - 补充指标仓库（enrichment_metric_repository）：PageSpeed 指标
/// - 配额仓库（quota_repository）：配额消耗记录
/// - 活动日志仓库（activity_log_repository）：活动与作业失败记录
/// - 站点仓库（site_repository）：被审计站点的只读访问
///
/// `stores::AuditStores` 把这些接口打包后交给编排器和工作器
pub mod audit_run_repository;
pub mod enrichment_metric_repository;
pub mod issue_repository;
pub mod page_result_repository;
pub mod quota_repository;
pub mod site_repository;
pub mod stores;
