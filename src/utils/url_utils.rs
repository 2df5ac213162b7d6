// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path.trim())
}

/// 以字符串形式解析相对链接
///
/// 翻页链接与详情链接都以当前页面地址为基准
pub fn resolve_href(base: &str, href: &str) -> Result<String, ParseError> {
    let base = Url::parse(base)?;
    Ok(resolve_url(&base, href)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve_href("http://example.com/a/b", "http://t.co/c").unwrap(),
            "http://t.co/c"
        );
    }

    #[test]
    fn test_resolve_protocol_relative_url() {
        assert_eq!(
            resolve_href("https://example.com/a/b", "//t.co/c").unwrap(),
            "https://t.co/c"
        );
    }

    #[test]
    fn test_resolve_root_relative_url() {
        assert_eq!(
            resolve_href("http://example.com/a/b", " /c?page=2 ").unwrap(),
            "http://example.com/c?page=2"
        );
    }

    #[test]
    fn test_resolve_relative_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "c").unwrap().as_str(),
            "http://example.com/a/c"
        );
    }

    #[test]
    fn test_resolve_invalid_base() {
        assert!(resolve_href("not a url", "/c").is_err());
    }
}
