// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::issue::SeverityCounts;

/// 每个严重问题的扣分
const CRITICAL_PENALTY: u32 = 8;
/// 严重问题扣分上限
const CRITICAL_CAP: u32 = 60;
const WARNING_PENALTY: u32 = 3;
const WARNING_CAP: u32 = 30;
const INFO_PENALTY: u32 = 1;
const INFO_CAP: u32 = 10;

/// 计算健康分数
///
/// `100 - min(critical*8, 60) - min(warning*3, 30) - min(info, 10)`，结果限制在 [0, 100]。
/// 每个级别单独封顶，任何一类问题都不能单独把分数扣到 0。
pub fn health_score(counts: &SeverityCounts) -> u8 {
    let penalty = counts.critical.saturating_mul(CRITICAL_PENALTY).min(CRITICAL_CAP)
        + counts.warning.saturating_mul(WARNING_PENALTY).min(WARNING_CAP)
        + counts.info.saturating_mul(INFO_PENALTY).min(INFO_CAP);

    100u32.saturating_sub(penalty).min(100) as u8
}
