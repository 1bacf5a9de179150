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

use crate::domain::models::page_result::PageResult;
use crate::domain::repositories::audit_run_repository::RepositoryError;
use crate::domain::repositories::page_result_repository::PageResultRepository;
use crate::domain::services::issue_rules::IssueRules;
use crate::domain::services::page_analyzer;
use crate::engines::traits::{FetchError, PageFetcher};
use crate::utils::url_utils::{normalize_url, url_path};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// 单个页面的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Succeeded,
    Failed,
}

#[derive(Error, Debug)]
enum PageError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Page processing timed out after {0}ms")]
    Timeout(u128),
}

/// 页面工作器
///
/// 抓取、分析并持久化一个URL。`process` 永远不会返回错误：
/// 任何失败都会写入一条降级的页面结果，并以 `PageOutcome::Failed` 上报。
pub struct PageWorker {
    fetcher: Arc<dyn PageFetcher>,
    rules: Arc<dyn IssueRules>,
    pages: Arc<dyn PageResultRepository>,
    page_timeout: Duration,
}

impl PageWorker {
    /// 创建新的页面工作器
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取器
    /// * `rules` - 问题规则
    /// * `pages` - 页面结果仓库
    /// * `page_timeout` - 抓取、分析和持久化的总预算
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        rules: Arc<dyn IssueRules>,
        pages: Arc<dyn PageResultRepository>,
        page_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            rules,
            pages,
            page_timeout,
        }
    }

    /// 处理一个URL
    #[instrument(skip(self), fields(run_id = %run_id, url = %url))]
    pub async fn process(&self, run_id: Uuid, url: &str) -> PageOutcome {
        let started = Instant::now();

        let result = match timeout(self.page_timeout, self.crawl_page(run_id, url, started)).await
        {
            Ok(result) => result,
            Err(_) => Err(PageError::Timeout(self.page_timeout.as_millis())),
        };

        histogram!("audit_page_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(page) => {
                debug!(
                    status_code = page.status_code,
                    issues = page.issues_count,
                    "Page processed"
                );
                counter!("audit_pages_total", "outcome" => "succeeded").increment(1);
                PageOutcome::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "Page failed");
                self.record_failure(run_id, url, started).await;
                counter!("audit_pages_total", "outcome" => "failed").increment(1);
                PageOutcome::Failed
            }
        }
    }

    async fn crawl_page(
        &self,
        run_id: Uuid,
        url: &str,
        started: Instant,
    ) -> Result<PageResult, PageError> {
        let response = self.fetcher.fetch(url).await?;
        let response_time_ms = started.elapsed().as_millis() as u64;

        let effective = normalize_url(&response.effective_url, None)
            .unwrap_or_else(|| response.effective_url.clone());
        let requested = normalize_url(url, None).unwrap_or_else(|| url.to_string());

        let mut page = PageResult::new(run_id, url, url_path(&effective));
        page.status_code = response.status_code;
        page.response_time_ms = Some(response_time_ms);
        page.content_type = response.content_type.clone();
        if effective != requested {
            page.final_url = Some(effective);
        }

        if response.is_html() {
            let facts = page_analyzer::analyze(&response.body, response.content_type.as_deref());
            page.title = facts.title;
            page.meta_description = facts.meta_description;
            page.canonical = facts.canonical;
            page.robots_meta = facts.robots_meta;
            page.h1_count = facts.h1_count;
            page.word_count = facts.word_count;
        }
        page.is_indexable =
            page_analyzer::is_indexable(page.status_code, page.robots_meta.as_deref());

        let issues = self.rules.generate_issues(&page);
        let saved = self.pages.save_page(&page, issues).await?;
        Ok(saved)
    }

    /// 写入降级结果，失败时只记录日志
    async fn record_failure(&self, run_id: Uuid, url: &str, started: Instant) {
        let page = PageResult::failed(
            run_id,
            url,
            url_path(url),
            started.elapsed().as_millis() as u64,
        );
        if let Err(e) = self.pages.save_page(&page, Vec::new()).await {
            error!(run_id = %run_id, url, error = %e, "Failed to record degraded page result");
        }
    }
}

#[cfg(test)]
#[path = "page_worker_test.rs"]
mod tests;
