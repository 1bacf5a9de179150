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

use crate::config::settings::PageSpeedSettings;
use crate::domain::models::enrichment_metric::{PageSpeedMetrics, Strategy};
use crate::domain::services::page_speed::{EnrichmentError, PageSpeedProvider};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// PageSpeed Insights v5 客户端
///
/// 未配置 API 密钥时所有请求都直接跳过
pub struct PageSpeedClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl PageSpeedClient {
    /// 根据配置创建客户端
    pub fn new(settings: &PageSpeedSettings) -> Result<Self, EnrichmentError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: settings.base_url.clone(),
            retry_policy: RetryPolicy::slow(),
        })
    }

    /// 替换重试策略
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// 是否已配置 API 密钥
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request_once(
        &self,
        api_key: &str,
        url: &str,
        strategy: Strategy,
    ) -> Result<Value, EnrichmentError> {
        let strategy = strategy.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("url", url),
                ("strategy", strategy.as_str()),
                ("category", "performance"),
                ("key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Api {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

fn is_retryable(err: &EnrichmentError) -> bool {
    match err {
        EnrichmentError::Request(e) => e.is_timeout() || e.is_connect(),
        EnrichmentError::Api { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        EnrichmentError::InvalidResponse(_) => false,
    }
}

/// 从 PageSpeed 响应中提取指标
///
/// 性能分数从 0-1 换算为 0-100；缺失的字段为 `None`
pub fn parse_metrics(payload: Value) -> Result<PageSpeedMetrics, EnrichmentError> {
    let lighthouse = payload
        .get("lighthouseResult")
        .ok_or_else(|| EnrichmentError::InvalidResponse("missing lighthouseResult".to_string()))?;

    let audit = |name: &str| {
        lighthouse
            .pointer(&format!("/audits/{}/numericValue", name))
            .and_then(Value::as_f64)
    };

    let performance_score = lighthouse
        .pointer("/categories/performance/score")
        .and_then(Value::as_f64)
        .map(|s| (s * 100.0).round());

    Ok(PageSpeedMetrics {
        performance_score,
        first_contentful_paint_ms: audit("first-contentful-paint"),
        largest_contentful_paint_ms: audit("largest-contentful-paint"),
        total_blocking_time_ms: audit("total-blocking-time"),
        cumulative_layout_shift: audit("cumulative-layout-shift"),
        speed_index_ms: audit("speed-index"),
        raw: payload,
    })
}

#[async_trait]
impl PageSpeedProvider for PageSpeedClient {
    async fn fetch_page_speed(
        &self,
        url: &str,
        strategy: Strategy,
    ) -> Result<Option<PageSpeedMetrics>, EnrichmentError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(url, %strategy, "PageSpeed API key not configured, skipping");
            return Ok(None);
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.request_once(api_key, url, strategy).await {
                Ok(payload) => return parse_metrics(payload).map(Some),
                Err(e) if is_retryable(&e) && self.retry_policy.should_retry(attempt) => {
                    warn!(url, %strategy, attempt, error = %e, "PageSpeed request failed, retrying");
                    sleep(self.retry_policy.calculate_backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
