// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 审计编排与收尾用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 页面抓取器
pub mod engines;

/// 基础设施模块
///
/// 数据库、sitemap、PageSpeed 与指标导出
pub mod infrastructure;

/// 队列模块
///
/// 补充数据任务队列
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 页面并发处理和后台工作器
pub mod workers;
