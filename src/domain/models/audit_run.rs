// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// 审计运行实体
///
/// 表示针对一个站点的一次完整审计执行，包含运行设置、
/// 执行状态、汇总统计和健康分数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRun {
    /// 运行唯一标识符
    pub id: Uuid,
    /// 被审计站点ID
    pub site_id: Uuid,
    /// 运行状态
    pub status: AuditStatus,
    /// 运行设置
    pub settings: AuditSettings,
    /// 存储的设置无法解析时的原因，此时 `settings` 为默认值
    #[serde(skip)]
    pub settings_error: Option<String>,
    /// 汇总统计
    pub summary: AuditSummary,
    /// 健康分数（0-100），仅在完成状态下存在
    pub health_score: Option<u8>,
    /// 失败原因，仅在失败状态下存在
    pub error_message: Option<String>,
    /// 开始时间
    pub started_at: Option<DateTime<Utc>>,
    /// 结束时间，完成或失败时设置
    pub finished_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl AuditRun {
    /// 创建一个排队中的审计运行
    pub fn new(site_id: Uuid, settings: AuditSettings) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            site_id,
            status: AuditStatus::Queued,
            settings,
            settings_error: None,
            summary: AuditSummary::default(),
            health_score: None,
            error_message: None,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 用于日志与失败记录关联的稳定引用
    pub fn run_ref(id: Uuid) -> String {
        format!("audit:{}", id)
    }
}

/// 审计运行状态
///
/// 状态转换只允许：
/// Queued → Running → Completed/Failed
/// 以及启动阶段失败时的 Queued → Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// 已入队
    #[default]
    Queued,
    /// 运行中
    Running,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

impl AuditStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuditStatus::Completed | AuditStatus::Failed)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuditStatus::Queued => write!(f, "queued"),
            AuditStatus::Running => write!(f, "running"),
            AuditStatus::Completed => write!(f, "completed"),
            AuditStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AuditStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(AuditStatus::Queued),
            "running" => Ok(AuditStatus::Running),
            "completed" => Ok(AuditStatus::Completed),
            "failed" => Ok(AuditStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 审计运行设置
///
/// 默认值：`crawl_limit` = 50，`max_depth` 不限，`include_sitemap` = true，
/// `include_cwv` = false。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuditSettings {
    /// 最多抓取的URL数量
    #[validate(range(min = 1, max = 10000))]
    pub crawl_limit: u32,
    /// sitemap 候选URL允许的最大路径深度
    pub max_depth: Option<u32>,
    /// 是否合并 sitemap 中发现的URL
    pub include_sitemap: bool,
    /// 是否在完成后获取 Core Web Vitals 补充数据
    pub include_cwv: bool,
}

impl AuditSettings {
    /// 检查设置取值范围
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            crawl_limit: 50,
            max_depth: None,
            include_sitemap: true,
            include_cwv: false,
        }
    }
}

/// 审计汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// 已抓取页面数
    pub pages_crawled: u32,
    /// 严重问题数
    pub issues_critical: u32,
    /// 警告问题数
    pub issues_warning: u32,
    /// 提示问题数
    pub issues_info: u32,
}
