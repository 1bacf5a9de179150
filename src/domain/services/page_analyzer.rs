// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

static TITLE: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("title").ok());
static META_DESCRIPTION: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse(r#"meta[name="description" i]"#).ok());
static META_ROBOTS: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse(r#"meta[name="robots" i]"#).ok());
static CANONICAL: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical" i]"#).ok());
static H1: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("h1").ok());

/// 不计入可见文本的元素
const INVISIBLE_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// 页面结构事实
///
/// 从 HTML 中尽力提取；缺失的字段为 `None` 或 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFacts {
    /// 页面标题
    pub title: Option<String>,
    /// meta description
    pub meta_description: Option<String>,
    /// canonical 链接目标
    pub canonical: Option<String>,
    /// robots meta 指令
    pub robots_meta: Option<String>,
    /// H1 数量
    pub h1_count: u32,
    /// 可见文本的词数（按空白分隔）
    pub word_count: u32,
}

/// 内容类型是否为 HTML
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// 可索引性判断
///
/// 状态码必须为 200，且 robots 指令中不含 `noindex`（不区分大小写）
pub fn is_indexable(status_code: u16, robots_meta: Option<&str>) -> bool {
    status_code == 200
        && !robots_meta
            .map(|r| r.to_ascii_lowercase().contains("noindex"))
            .unwrap_or(false)
}

/// 分析页面
///
/// 只有内容类型为 HTML 时才解析正文，否则返回空事实。
/// 解析对畸形标记容错，不会失败。
///
/// # 参数
///
/// * `body` - 响应正文
/// * `content_type` - 响应内容类型
///
/// # 返回值
///
/// 提取出的页面事实
pub fn analyze(body: &str, content_type: Option<&str>) -> PageFacts {
    if !content_type.map(is_html_content_type).unwrap_or(false) {
        return PageFacts::default();
    }

    let document = Html::parse_document(body);

    PageFacts {
        title: first_text(&document, &TITLE),
        meta_description: first_attr(&document, &META_DESCRIPTION, "content"),
        canonical: first_attr(&document, &CANONICAL, "href"),
        robots_meta: first_attr(&document, &META_ROBOTS, "content"),
        h1_count: count(&document, &H1),
        word_count: visible_word_count(&document),
    }
}

fn first_text(document: &Html, selector: &Lazy<Option<Selector>>) -> Option<String> {
    let selector = selector.as_ref()?;
    document
        .select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn first_attr(document: &Html, selector: &Lazy<Option<Selector>>, attr: &str) -> Option<String> {
    let selector = selector.as_ref()?;
    document
        .select(selector)
        .filter_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn count(document: &Html, selector: &Lazy<Option<Selector>>) -> u32 {
    selector
        .as_ref()
        .map(|s| document.select(s).count() as u32)
        .unwrap_or(0)
}

fn visible_word_count(document: &Html) -> u32 {
    let mut words = 0usize;
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ElementRef::wrap(ancestor)
                .map(|el| INVISIBLE_ELEMENTS.contains(&el.value().name()))
                .unwrap_or(false)
        });
        if !hidden {
            words += text.split_whitespace().count();
        }
    }
    words as u32
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
