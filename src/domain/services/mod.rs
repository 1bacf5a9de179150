// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 审计管道中的纯业务规则和外部协作者的抽象接口：
/// - 页面分析（page_analyzer）：从 HTML 中提取结构事实并判断可索引性
/// - 问题规则（issue_rules）：单页面规则和跨页面重复检查
/// - 健康分数（health_score）：按问题级别计算的饱和扣分模型
/// - sitemap 发现（sitemap_discovery）：候选URL来源
/// - PageSpeed（page_speed）：可选的补充数据来源
pub mod health_score;
pub mod issue_rules;
pub mod page_analyzer;
pub mod page_speed;
pub mod sitemap_discovery;
