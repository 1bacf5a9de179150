// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::sitemap_discovery::SitemapDiscovery;
use crate::utils::url_utils::resolve_url;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use robotstxt::{parse_robotstxt, RobotsParseHandler};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// 每个 sitemap 索引最多跟随的子 sitemap 数量
const MAX_CHILD_SITEMAPS: usize = 10;

/// 基于 HTTP 的 sitemap 发现
///
/// 先读取 `/robots.txt` 中的 `Sitemap:` 行，没有时回退到 `/sitemap.xml`；
/// sitemap 索引只跟随一层。
pub struct HttpSitemapDiscovery {
    client: Client,
}

impl HttpSitemapDiscovery {
    /// 创建新的 sitemap 发现实例
    ///
    /// # 参数
    ///
    /// * `user_agent` - 请求使用的 User-Agent
    /// * `timeout` - 单次请求超时
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Option<String> {
        match self.client.get(url).send().await {
            Ok(res) if res.status().is_success() => res.text().await.ok(),
            Ok(res) => {
                debug!(url, status = res.status().as_u16(), "Sitemap source unavailable");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to fetch sitemap source");
                None
            }
        }
    }

    async fn sitemap_sources(&self, origin: &Url) -> Vec<String> {
        let mut sources = Vec::new();

        if let Ok(robots_url) = resolve_url(origin, "/robots.txt") {
            if let Some(text) = self.get_text(robots_url.as_str()).await {
                sources.extend(parse_robots_sitemaps(&text, origin));
            }
        }

        if sources.is_empty() {
            if let Ok(fallback) = resolve_url(origin, "/sitemap.xml") {
                sources.push(fallback.to_string());
            }
        }

        sources
    }
}

#[async_trait]
impl SitemapDiscovery for HttpSitemapDiscovery {
    async fn discover(&self, start_url: &str, limit: usize) -> Result<Vec<String>> {
        let origin = Url::parse(start_url)
            .map_err(|e| anyhow!("Invalid start URL {}: {}", start_url, e))?;

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        if limit == 0 {
            return Ok(urls);
        }

        for source in self.sitemap_sources(&origin).await {
            let Some(xml) = self.get_text(&source).await else {
                continue;
            };

            let sitemap = parse_sitemap(&xml);
            let documents = if sitemap.is_index {
                let mut children = Vec::new();
                for child in sitemap.locs.into_iter().take(MAX_CHILD_SITEMAPS) {
                    if let Some(child_xml) = self.get_text(&child).await {
                        children.push(parse_sitemap(&child_xml));
                    }
                }
                children
            } else {
                vec![sitemap]
            };

            for document in documents {
                for loc in document.locs {
                    if seen.insert(loc.clone()) {
                        urls.push(loc);
                        if urls.len() >= limit {
                            debug!(start_url, count = urls.len(), "Sitemap limit reached");
                            return Ok(urls);
                        }
                    }
                }
            }
        }

        debug!(start_url, count = urls.len(), "Sitemap discovery finished");
        Ok(urls)
    }
}

/// 收集 robots.txt 中的 `Sitemap:` 值
#[derive(Default)]
struct SitemapLines {
    values: Vec<String>,
}

impl RobotsParseHandler for SitemapLines {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

/// 解析 robots.txt 中的 `Sitemap:` 行，相对地址按站点解析
fn parse_robots_sitemaps(robots: &str, origin: &Url) -> Vec<String> {
    let mut lines = SitemapLines::default();
    parse_robotstxt(robots, &mut lines);

    lines
        .values
        .iter()
        .filter_map(|value| resolve_url(origin, value).ok().map(|u| u.to_string()))
        .collect()
}

/// 一份 sitemap 文档的内容
#[derive(Debug, Default, PartialEq)]
struct SitemapDocument {
    /// 根元素为 `sitemapindex`
    is_index: bool,
    /// `<loc>` 的值，实体已解码
    locs: Vec<String>,
}

/// 解析 sitemap XML
///
/// 元素按本地名匹配，`<sm:loc>` 这类带前缀的写法同样识别。
/// 文档格式错误时保留已读到的条目。
fn parse_sitemap(xml: &str) -> SitemapDocument {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut document = SitemapDocument::default();
    let mut in_loc = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemapindex" => document.is_index = true,
                b"loc" => {
                    in_loc = true;
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_loc => match t.unescape() {
                Ok(value) => text.push_str(&value),
                Err(e) => debug!(error = %e, "Skipping undecodable sitemap text"),
            },
            Ok(Event::CData(c)) if in_loc => text.push_str(&String::from_utf8_lossy(&c)),
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = text.trim();
                if !loc.is_empty() {
                    document.locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    "Malformed sitemap XML"
                );
                break;
            }
            _ => {}
        }
    }

    document
}
