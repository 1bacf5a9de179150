// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// PageSpeed 测量策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    /// 所有策略，按补充任务的入队顺序
    pub const ALL: [Strategy; 2] = [Strategy::Mobile, Strategy::Desktop];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strategy::Mobile => write!(f, "mobile"),
            Strategy::Desktop => write!(f, "desktop"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            _ => Err(()),
        }
    }
}

/// 补充数据任务
///
/// 审计完成后针对一个 (页面, 策略) 组合的 PageSpeed 请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentTask {
    pub run_id: Uuid,
    pub url: String,
    pub strategy: Strategy,
}

/// PageSpeed 返回的性能指标
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpeedMetrics {
    /// 性能分数（0-100）
    pub performance_score: Option<f64>,
    pub first_contentful_paint_ms: Option<f64>,
    pub largest_contentful_paint_ms: Option<f64>,
    pub total_blocking_time_ms: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
    pub speed_index_ms: Option<f64>,
    /// 服务商原始响应
    pub raw: serde_json::Value,
}

/// 补充指标实体
///
/// 以 `(run_id, url, strategy)` 为键；写入失败不影响审计运行的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentMetric {
    pub id: Uuid,
    pub run_id: Uuid,
    pub url: String,
    pub strategy: Strategy,
    pub performance_score: Option<f64>,
    pub first_contentful_paint_ms: Option<f64>,
    pub largest_contentful_paint_ms: Option<f64>,
    pub total_blocking_time_ms: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
    pub speed_index_ms: Option<f64>,
    pub raw: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl EnrichmentMetric {
    /// 根据任务和测量结果创建实体
    pub fn from_metrics(task: &EnrichmentTask, metrics: PageSpeedMetrics) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id: task.run_id,
            url: task.url.clone(),
            strategy: task.strategy,
            performance_score: metrics.performance_score,
            first_contentful_paint_ms: metrics.first_contentful_paint_ms,
            largest_contentful_paint_ms: metrics.largest_contentful_paint_ms,
            total_blocking_time_ms: metrics.total_blocking_time_ms,
            cumulative_layout_shift: metrics.cumulative_layout_shift,
            speed_index_ms: metrics.speed_index_ms,
            raw: metrics.raw,
            created_at: Utc::now(),
        }
    }
}
