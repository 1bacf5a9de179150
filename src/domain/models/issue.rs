// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 问题严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// 严重
    Critical,
    /// 警告
    Warning,
    /// 提示
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(()),
        }
    }
}

/// 规则产生的问题（尚未持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    /// 严重级别
    pub severity: Severity,
    /// 规则标识，例如 `missing_title`
    pub issue_type: String,
    /// 可读消息
    pub message: String,
    /// 规则相关的结构化数据
    pub data: serde_json::Value,
}

impl NewIssue {
    pub fn new(
        severity: Severity,
        issue_type: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            severity,
            issue_type: issue_type.into(),
            message: message.into(),
            data,
        }
    }
}

/// 问题实体
///
/// 附加在页面上的一条规则违规；跨页面规则（如重复标题）产生的问题没有 `page_id`。
/// 只追加，创建后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// 问题唯一标识符
    pub id: Uuid,
    /// 所属审计运行ID
    pub run_id: Uuid,
    /// 所属页面ID
    pub page_id: Option<Uuid>,
    /// 严重级别
    pub severity: Severity,
    /// 规则标识
    pub issue_type: String,
    /// 可读消息
    pub message: String,
    /// 结构化数据
    pub data: serde_json::Value,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Issue {
    /// 从规则输出创建问题实体
    pub fn from_new(run_id: Uuid, page_id: Option<Uuid>, issue: NewIssue) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            page_id,
            severity: issue.severity,
            issue_type: issue.issue_type,
            message: issue.message,
            data: issue.data,
            created_at: Utc::now(),
        }
    }
}

/// 按严重级别统计的问题数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: u32,
    pub warning: u32,
    pub info: u32,
}

impl SeverityCounts {
    /// 累加一个级别的数量
    pub fn add(&mut self, severity: Severity, count: u32) {
        match severity {
            Severity::Critical => self.critical += count,
            Severity::Warning => self.warning += count,
            Severity::Info => self.info += count,
        }
    }

    pub fn total(&self) -> u32 {
        self.critical + self.warning + self.info
    }
}
