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

use crate::engines::traits::{FetchError, FetchResponse, FetcherConfig, PageFetcher};
use crate::engines::validators::{self, is_allowed_scheme};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use metrics::counter;
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取器，带超时、受限重定向和固定退避重试
pub struct ReqwestFetcher {
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl ReqwestFetcher {
    /// 创建新的抓取器实例
    ///
    /// # 参数
    ///
    /// * `config` - 抓取器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestFetcher)` - 抓取器
    /// * `Err(FetchError)` - HTTP客户端构建失败
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let max_redirects = config.max_redirects;
        // Strict redirect handling: cap the chain and refuse anything but http/https
        let redirect_policy = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("too many redirects (max {})", max_redirects))
            } else if !is_allowed_scheme(attempt.url()) {
                let scheme = attempt.url().scheme().to_string();
                attempt.error(format!("redirect to unsupported scheme '{}'", scheme))
            } else {
                attempt.follow()
            }
        });

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .redirect(redirect_policy)
            .build()?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::fixed(config.max_attempts, config.backoff),
        })
    }

    async fn fetch_once(&self, url: Url) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let effective_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let mut headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                headers.insert(k.as_str().to_string(), v_str.to_string());
            }
        }

        let body = response.text().await?;

        Ok(FetchResponse {
            status_code,
            effective_url,
            content_type,
            headers,
            body,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 任意状态码的响应
    /// * `Err(FetchError)` - 非法URL、不可重试的错误或重试耗尽
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let url = validators::validate_fetch_url(url)?;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once(url.clone()).await {
                Ok(response) => {
                    debug!(
                        url = %url,
                        status = response.status_code,
                        attempt,
                        "Fetch completed"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_retryable() => {
                    if !self.retry_policy.should_retry(attempt) {
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }
                    warn!(url = %url, attempt, error = %e, "Transient fetch error, retrying");
                    counter!("audit_fetch_retries_total").increment(1);
                    sleep(self.retry_policy.calculate_backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
