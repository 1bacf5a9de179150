// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 收尾阶段产生的补充数据任务在这里排队，由补充数据工作器消费
pub mod enrichment_queue;
