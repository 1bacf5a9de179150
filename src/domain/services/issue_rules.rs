// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::issue::{NewIssue, Severity};
use crate::domain::models::page_result::PageResult;
use serde_json::json;
use std::collections::BTreeMap;

/// 标题最大长度（字符）
pub const TITLE_MAX_CHARS: usize = 60;
/// 标题最小长度（字符）
pub const TITLE_MIN_CHARS: usize = 10;
/// meta description 最大长度（字符）
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;
/// 少于该词数视为内容过少（警告）
pub const THIN_CONTENT_WORDS: u32 = 50;
/// 少于该词数视为内容偏少（提示）
pub const LOW_CONTENT_WORDS: u32 = 200;
/// 响应慢的阈值（毫秒）
pub const SLOW_RESPONSE_MS: u64 = 3000;

/// 重复标题的问题类型
pub const DUPLICATE_TITLE: &str = "duplicate_title";

/// 问题规则特质
///
/// 把一个页面的事实转换为问题列表，以及在运行结束时做跨页面检查。
/// 两个方法都是纯函数。
pub trait IssueRules: Send + Sync {
    /// 为单个页面生成问题
    fn generate_issues(&self, page: &PageResult) -> Vec<NewIssue>;

    /// 跨页面重复检查
    fn check_cross_page_duplicates(&self, pages: &[PageResult]) -> Vec<NewIssue>;
}

/// 默认规则目录
#[derive(Debug, Clone, Default)]
pub struct DefaultIssueRules;

impl DefaultIssueRules {
    pub fn new() -> Self {
        Self
    }

    fn status_issues(page: &PageResult, issues: &mut Vec<NewIssue>) {
        let status = page.status_code;
        if status >= 500 {
            issues.push(NewIssue::new(
                Severity::Critical,
                "server_error",
                format!("Server responded with HTTP {}", status),
                json!({ "status_code": status }),
            ));
        } else if status >= 400 {
            issues.push(NewIssue::new(
                Severity::Critical,
                "client_error",
                format!("Page responded with HTTP {}", status),
                json!({ "status_code": status }),
            ));
        }
    }

    fn content_issues(page: &PageResult, issues: &mut Vec<NewIssue>) {
        match page.title.as_deref() {
            None => issues.push(NewIssue::new(
                Severity::Critical,
                "missing_title",
                "Page has no title",
                json!({}),
            )),
            Some(title) => {
                let len = title.chars().count();
                if len > TITLE_MAX_CHARS {
                    issues.push(NewIssue::new(
                        Severity::Warning,
                        "title_too_long",
                        format!("Title is {} characters (max {})", len, TITLE_MAX_CHARS),
                        json!({ "title": title, "length": len }),
                    ));
                } else if len < TITLE_MIN_CHARS {
                    issues.push(NewIssue::new(
                        Severity::Warning,
                        "title_too_short",
                        format!("Title is {} characters (min {})", len, TITLE_MIN_CHARS),
                        json!({ "title": title, "length": len }),
                    ));
                }
            }
        }

        match page.meta_description.as_deref() {
            None => issues.push(NewIssue::new(
                Severity::Warning,
                "missing_meta_description",
                "Page has no meta description",
                json!({}),
            )),
            Some(description) => {
                let len = description.chars().count();
                if len > META_DESCRIPTION_MAX_CHARS {
                    issues.push(NewIssue::new(
                        Severity::Info,
                        "meta_description_too_long",
                        format!(
                            "Meta description is {} characters (max {})",
                            len, META_DESCRIPTION_MAX_CHARS
                        ),
                        json!({ "length": len }),
                    ));
                }
            }
        }

        match page.h1_count {
            0 => issues.push(NewIssue::new(
                Severity::Warning,
                "missing_h1",
                "Page has no H1 heading",
                json!({}),
            )),
            1 => {}
            n => issues.push(NewIssue::new(
                Severity::Info,
                "multiple_h1",
                format!("Page has {} H1 headings", n),
                json!({ "h1_count": n }),
            )),
        }

        if page.word_count < THIN_CONTENT_WORDS {
            issues.push(NewIssue::new(
                Severity::Warning,
                "thin_content",
                format!("Page has only {} words", page.word_count),
                json!({ "word_count": page.word_count }),
            ));
        } else if page.word_count < LOW_CONTENT_WORDS {
            issues.push(NewIssue::new(
                Severity::Info,
                "low_word_count",
                format!("Page has {} words", page.word_count),
                json!({ "word_count": page.word_count }),
            ));
        }

        let noindex = page
            .robots_meta
            .as_deref()
            .map(|r| r.to_ascii_lowercase().contains("noindex"))
            .unwrap_or(false);
        if noindex {
            issues.push(NewIssue::new(
                Severity::Warning,
                "noindex",
                "Page is excluded from indexing by a robots directive",
                json!({ "robots": page.robots_meta }),
            ));
        }

        if page.canonical.is_none() {
            issues.push(NewIssue::new(
                Severity::Info,
                "missing_canonical",
                "Page has no canonical link",
                json!({}),
            ));
        }
    }
}

impl IssueRules for DefaultIssueRules {
    fn generate_issues(&self, page: &PageResult) -> Vec<NewIssue> {
        let mut issues = Vec::new();

        // Fetch-level failures carry no facts to judge
        if page.is_fetch_failure() {
            return issues;
        }

        Self::status_issues(page, &mut issues);

        let is_html = page
            .content_type
            .as_deref()
            .map(super::page_analyzer::is_html_content_type)
            .unwrap_or(false);
        if page.status_code == 200 && is_html {
            Self::content_issues(page, &mut issues);
        }

        if let Some(ms) = page.response_time_ms {
            if ms > SLOW_RESPONSE_MS {
                issues.push(NewIssue::new(
                    Severity::Warning,
                    "slow_response",
                    format!("Response took {} ms", ms),
                    json!({ "response_time_ms": ms }),
                ));
            }
        }

        if let Some(final_url) = page.final_url.as_deref() {
            issues.push(NewIssue::new(
                Severity::Info,
                "redirected",
                format!("URL redirects to {}", final_url),
                json!({ "from": page.url, "to": final_url }),
            ));
        }

        issues
    }

    fn check_cross_page_duplicates(&self, pages: &[PageResult]) -> Vec<NewIssue> {
        let mut by_title: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for page in pages.iter().filter(|p| p.status_code == 200) {
            if let Some(title) = page.title.as_deref() {
                let key = title.trim().to_lowercase();
                if !key.is_empty() {
                    by_title.entry(key).or_default().push(page.url.as_str());
                }
            }
        }

        by_title
            .into_iter()
            .filter(|(_, urls)| urls.len() > 1)
            .map(|(title, mut urls)| {
                urls.sort_unstable();
                NewIssue::new(
                    Severity::Info,
                    DUPLICATE_TITLE,
                    format!("Title \"{}\" is used on {} pages", title, urls.len()),
                    json!({ "title": title, "urls": urls }),
                )
            })
            .collect()
    }
}
