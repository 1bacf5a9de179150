// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 审计运行的编排与收尾用例，
/// 只依赖领域层的仓库与服务特质
pub mod use_cases;
