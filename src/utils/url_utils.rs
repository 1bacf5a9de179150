// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 规范化URL
///
/// - 裸主机名（`example.com/about`）补全为 `https://`
/// - 以 `/` 开头的路径按 `host_hint` 解析
/// - 只接受 http/https
/// - 去掉片段，空路径变为 `/`
/// - 给出 `host_hint` 时，主机（忽略开头的 `www.`）和端口必须与之一致
///
/// # 参数
///
/// * `raw` - 原始URL
/// * `host_hint` - 站点URL或主机名
///
/// # 返回值
///
/// 规范化后的URL，无法规范化时返回 `None`
pub fn normalize_url(raw: &str, host_hint: Option<&str>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let base = match host_hint {
        Some(hint) => Some(parse_lenient(hint)?),
        None => None,
    };

    let mut url = if raw.starts_with('/') && !raw.starts_with("//") {
        resolve_url(base.as_ref()?, raw).ok()?
    } else {
        parse_lenient(raw)?
    };

    if let Some(base) = &base {
        if !same_site(&url, base) {
            return None;
        }
    }

    url.set_fragment(None);
    if url.path().is_empty() {
        url.set_path("/");
    }

    Some(url.to_string())
}

/// 返回URL的路径部分，无法解析时返回 `/`
pub fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|u| {
            let path = u.path();
            if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            }
        })
        .unwrap_or_else(|_| "/".to_string())
}

/// 路径深度（非空段的数量），首页为 0
pub fn path_depth(url: &str) -> usize {
    url_path(url).split('/').filter(|s| !s.is_empty()).count()
}

fn parse_lenient(raw: &str) -> Option<Url> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", raw.trim_start_matches("//"))).ok()?
        }
        Err(_) => return None,
    };
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(url)
}

fn same_site(url: &Url, base: &Url) -> bool {
    let strip = |u: &Url| {
        u.host_str()
            .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    };
    strip(url) == strip(base) && url.port() == base.port()
}
