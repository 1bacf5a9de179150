// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// `audit_orchestrator` 驱动一次运行从排队到完成或失败，
/// `finalizer` 负责汇总、评分以及完成后的副作用
pub mod audit_orchestrator;
pub mod finalizer;
