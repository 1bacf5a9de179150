// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据库表对应的实体结构
/// 使用SeaORM框架进行对象关系映射
pub mod activity_log;
pub mod audit_run;
pub mod enrichment_metric;
pub mod issue;
pub mod page_result;
pub mod quota_usage;
pub mod site;
