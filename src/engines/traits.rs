// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 不支持的URL（无效或非 http/https）
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
    /// 重试耗尽
    #[error("Fetch failed after {attempts} attempts: {last_error}")]
    Exhausted {
        /// 已尝试次数
        attempts: u32,
        /// 最后一次错误
        last_error: String,
    },
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// 只有连接错误和超时属于瞬时故障；HTTP 4xx/5xx 是终态响应，不在这里出现
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(e) => {
                !e.is_redirect() && (e.is_timeout() || e.is_connect() || e.is_request())
            }
            FetchError::Timeout => true,
            _ => false,
        }
    }
}

/// 抓取器配置
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// 单次请求超时
    pub timeout: Duration,
    /// 总尝试次数（含首次）
    pub max_attempts: u32,
    /// 重试间的固定退避
    pub backoff: Duration,
    /// 最大重定向次数
    pub max_redirects: usize,
    /// User-Agent
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_attempts: 2,
            backoff: Duration::from_millis(100),
            max_redirects: 5,
            user_agent: "Mozilla/5.0 (compatible; siteaudit/0.1; +https://siteaudit.dev/bot)"
                .to_string(),
        }
    }
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 跟随重定向后的最终URL
    pub effective_url: String,
    /// 内容类型
    pub content_type: Option<String>,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 响应内容
    pub body: String,
    /// 响应时间（毫秒）
    pub elapsed_ms: u64,
}

impl FetchResponse {
    /// 内容类型是否为 HTML
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(crate::domain::services::page_analyzer::is_html_content_type)
            .unwrap_or(false)
    }
}

/// 页面抓取器特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 执行抓取
    ///
    /// 任何 HTTP 状态码都作为成功响应返回；只有传输层失败（重试耗尽后）才返回错误
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}
