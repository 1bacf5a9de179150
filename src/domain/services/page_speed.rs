// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrichment_metric::{PageSpeedMetrics, Strategy};
use async_trait::async_trait;
use thiserror::Error;

/// 补充数据错误
#[derive(Error, Debug)]
pub enum EnrichmentError {
    /// 请求失败
    #[error("PageSpeed request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务商返回错误状态
    #[error("PageSpeed API returned HTTP {status}: {body}")]
    Api {
        /// HTTP状态码
        status: u16,
        /// 响应正文摘要
        body: String,
    },
    /// 响应无法解析
    #[error("Invalid PageSpeed response: {0}")]
    InvalidResponse(String),
}

/// PageSpeed 服务特质
#[async_trait]
pub trait PageSpeedProvider: Send + Sync {
    /// 获取一个URL在指定策略下的性能指标
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(metrics))` - 获取成功
    /// * `Ok(None)` - 未配置，跳过
    /// * `Err(EnrichmentError)` - 请求或解析失败
    async fn fetch_page_speed(
        &self,
        url: &str,
        strategy: Strategy,
    ) -> Result<Option<PageSpeedMetrics>, EnrichmentError>;
}
