// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 页面结果实体
///
/// 一次审计运行中一个已抓取并分析的URL。
/// `(run_id, url)` 是自然键，同一运行内不会出现两个相同 URL 的结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 结果唯一标识符
    pub id: Uuid,
    /// 所属审计运行ID
    pub run_id: Uuid,
    /// 原始请求URL
    pub url: String,
    /// 规范化后的路径
    pub path: String,
    /// HTTP状态码，0 表示抓取层失败
    pub status_code: u16,
    /// 最终URL，仅在发生重定向时存在
    pub final_url: Option<String>,
    /// 响应时间（毫秒）
    pub response_time_ms: Option<u64>,
    /// 内容类型
    pub content_type: Option<String>,
    /// 页面标题
    pub title: Option<String>,
    /// meta description
    pub meta_description: Option<String>,
    /// canonical 链接
    pub canonical: Option<String>,
    /// robots meta 指令
    pub robots_meta: Option<String>,
    /// H1 数量
    pub h1_count: u32,
    /// 可见文本词数
    pub word_count: u32,
    /// 是否可被索引
    pub is_indexable: bool,
    /// 该页面产生的问题数量
    pub issues_count: u32,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl PageResult {
    /// 创建一个空白页面结果
    pub fn new(run_id: Uuid, url: impl Into<String>, path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            run_id,
            url: url.into(),
            path: path.into(),
            status_code: 0,
            final_url: None,
            response_time_ms: None,
            content_type: None,
            title: None,
            meta_description: None,
            canonical: None,
            robots_meta: None,
            h1_count: 0,
            word_count: 0,
            is_indexable: false,
            issues_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 创建抓取失败时的降级结果
    ///
    /// 状态码为 0，不可索引，没有问题记录
    pub fn failed(
        run_id: Uuid,
        url: impl Into<String>,
        path: impl Into<String>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            response_time_ms: Some(response_time_ms),
            ..Self::new(run_id, url, path)
        }
    }

    /// 是否为抓取层失败
    pub fn is_fetch_failure(&self) -> bool {
        self.status_code == 0
    }

    /// 是否发生了重定向
    pub fn was_redirected(&self) -> bool {
        self.final_url.is_some()
    }
}
