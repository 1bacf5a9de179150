// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

use crate::engines::traits::FetchError;

/// 验证 URL 是否可以抓取
///
/// 只接受带主机名的 http/https URL
pub fn validate_fetch_url(url_str: &str) -> Result<Url, FetchError> {
    let url = Url::parse(url_str)
        .map_err(|e| FetchError::UnsupportedUrl(format!("{}: {}", url_str, e)))?;

    if !is_allowed_scheme(&url) {
        return Err(FetchError::UnsupportedUrl(format!(
            "scheme '{}' is not allowed",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(FetchError::UnsupportedUrl(format!(
            "{}: missing host",
            url_str
        )));
    }

    Ok(url)
}

/// 重定向目标是否允许跟随
pub fn is_allowed_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
