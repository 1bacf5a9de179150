// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 站点实体
///
/// 被审计的域名记录，由外部系统维护，审计管道只读取
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// 站点唯一标识符
    pub id: Uuid,
    /// 所属账户ID，用于配额计量
    pub account_id: Uuid,
    /// 创建站点的用户ID
    pub user_id: Option<Uuid>,
    /// 主机名，例如 `example.com`
    pub host: String,
    /// 站点规范首页URL
    pub canonical_url: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Site {
    /// 创建新的站点
    pub fn new(account_id: Uuid, host: impl Into<String>, canonical_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            user_id: None,
            host: host.into(),
            canonical_url: canonical_url.into(),
            created_at: Utc::now(),
        }
    }
}
