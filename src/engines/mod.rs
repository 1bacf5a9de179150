// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取引擎模块
///
/// 单次 HTTP 抓取：超时、受限重定向和瞬时故障重试
pub mod reqwest_engine;
pub mod traits;
pub mod validators;
