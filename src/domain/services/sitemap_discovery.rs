// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

/// sitemap 发现特质
///
/// 从站点首页出发返回候选URL列表，最多 `limit` 个。
/// 返回的URL尚未规范化，调用方负责过滤和去重。
#[async_trait]
pub trait SitemapDiscovery: Send + Sync {
    /// 发现 sitemap 中的URL
    ///
    /// # 参数
    ///
    /// * `start_url` - 站点首页URL
    /// * `limit` - 返回URL数量上限
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<String>)` - 候选URL（可能为空）
    /// * `Err(anyhow::Error)` - 发现过程失败
    async fn discover(&self, start_url: &str, limit: usize) -> anyhow::Result<Vec<String>>;
}
