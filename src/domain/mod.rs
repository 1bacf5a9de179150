// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含审计管道的核心业务逻辑，包括：
/// - 领域模型（models）：审计运行、页面结果、问题等实体
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：页面分析、问题规则、健康分数和协作者接口
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod services;
