// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了审计管道的核心业务实体，包括：
/// - 审计运行（audit_run）：一次针对站点的完整审计及其设置与汇总
/// - 页面结果（page_result）：一个已抓取并分析的URL
/// - 问题（issue）：附加在页面或运行上的规则违规
/// - 补充指标（enrichment_metric）：PageSpeed 等二级数据
/// - 站点（site）：被审计的域名
pub mod audit_run;
pub mod enrichment_metric;
pub mod issue;
pub mod page_result;
pub mod site;
