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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::engines::traits::FetcherConfig;

/// 应用程序配置设置
///
/// 包含数据库、审计管道、工作器、PageSpeed、日志和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 审计管道各阶段的预算配置
    pub pipeline: PipelineSettings,
    /// 工作器配置
    pub workers: WorkerSettings,
    /// PageSpeed 配置
    pub pagespeed: PageSpeedSettings,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 审计管道配置
///
/// 每个阶段的重试与超时预算都在这里显式给出：
/// 抓取器（单次请求超时、重试次数、退避、重定向上限）、
/// 页面工作器（整体超时）、编排器（外层超时）以及批处理并发上限。
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 单次抓取超时（毫秒）
    pub fetch_timeout_ms: u64,
    /// 抓取总尝试次数（含首次）
    pub fetch_retries: u32,
    /// 重试间的固定退避（毫秒）
    pub fetch_backoff_ms: u64,
    /// 最大重定向次数
    pub max_redirects: usize,
    /// 批处理并发上限
    pub concurrency_limit: usize,
    /// 单个页面任务的整体超时（毫秒）
    pub page_timeout_ms: u64,
    /// 整个审计运行的外层超时（毫秒）
    pub outer_run_timeout_ms: u64,
    /// 抓取时使用的 User-Agent
    pub user_agent: String,
}

impl PipelineSettings {
    /// 转换为抓取器配置
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_millis(self.fetch_timeout_ms),
            max_attempts: self.fetch_retries.max(1),
            backoff: Duration::from_millis(self.fetch_backoff_ms),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }

    /// 转换为管道运行限制
    pub fn limits(&self) -> PipelineLimits {
        PipelineLimits {
            concurrency_limit: self.concurrency_limit.max(1),
            page_timeout: Duration::from_millis(self.page_timeout_ms),
            outer_run_timeout: Duration::from_millis(self.outer_run_timeout_ms),
        }
    }
}

/// 管道运行限制
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    /// 批处理并发上限
    pub concurrency_limit: usize,
    /// 单个页面任务的整体超时
    pub page_timeout: Duration,
    /// 整个审计运行的外层超时
    pub outer_run_timeout: Duration,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            concurrency_limit: 10,
            page_timeout: Duration::from_secs(60),
            outer_run_timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// 工作器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// 审计工作器数量
    pub audit_workers: usize,
    /// 轮询排队审计的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 补充数据工作器数量
    pub enrichment_workers: usize,
    /// 补充数据队列容量
    pub enrichment_queue_capacity: usize,
    /// running 状态持续多久后视为中断（毫秒），应大于外层超时
    pub stale_run_after_ms: u64,
    /// 遗留运行扫描间隔（毫秒）
    pub sweep_interval_ms: u64,
}

/// PageSpeed 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PageSpeedSettings {
    /// API 密钥，未配置时跳过补充数据
    pub api_key: Option<String>,
    /// API 基础地址
    pub base_url: String,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 默认过滤规则，`RUST_LOG` 优先
    pub filter: String,
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、配置文件和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default DB settings
            .set_default("database.url", "sqlite://siteaudit.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default pipeline budgets
            .set_default("pipeline.fetch_timeout_ms", 20_000)?
            .set_default("pipeline.fetch_retries", 2)?
            .set_default("pipeline.fetch_backoff_ms", 100)?
            .set_default("pipeline.max_redirects", 5)?
            .set_default("pipeline.concurrency_limit", 10)?
            .set_default("pipeline.page_timeout_ms", 60_000)?
            .set_default("pipeline.outer_run_timeout_ms", 900_000)?
            .set_default(
                "pipeline.user_agent",
                "Mozilla/5.0 (compatible; siteaudit/0.1; +https://siteaudit.dev/bot)",
            )?
            // Default worker settings
            .set_default("workers.audit_workers", 2)?
            .set_default("workers.poll_interval_ms", 1_000)?
            .set_default("workers.enrichment_workers", 2)?
            .set_default("workers.enrichment_queue_capacity", 256)?
            .set_default("workers.stale_run_after_ms", 1_800_000)?
            .set_default("workers.sweep_interval_ms", 60_000)?
            // Default PageSpeed settings
            .set_default(
                "pagespeed.base_url",
                "https://www.googleapis.com/pagespeedonline/v5/runPagespeed",
            )?
            .set_default("pagespeed.timeout_ms", 60_000)?
            // Default logging / metrics settings
            .set_default("logging.filter", "info,siteaudit=debug")?
            .set_default("logging.json", false)?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SITEAUDIT").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
