// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{Html, Selector};

use crate::utils::errors::PaginateError;
use crate::utils::url_utils::resolve_href;

/// 翻页器特质
///
/// 根据当前页面计算下一页的 URL，`Ok(None)` 表示没有下一页
pub trait Paginator: Send + Sync {
    fn next_page(&self, current_url: &str, doc: &Html) -> Result<Option<String>, PaginateError>;
}

/// 不翻页
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPaginator;

impl Paginator for NoopPaginator {
    fn next_page(&self, _current_url: &str, _doc: &Html) -> Result<Option<String>, PaginateError> {
        Ok(None)
    }
}

/// 基于选择器的翻页器
///
/// 读取第一个匹配元素的属性（默认 href），并相对当前 URL 解析
#[derive(Debug, Clone)]
pub struct SelectorPaginator {
    selector: Selector,
    attribute: String,
}

impl SelectorPaginator {
    pub fn new(selector: Selector, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self {
            selector,
            attribute: if attribute.is_empty() {
                "href".to_string()
            } else {
                attribute
            },
        }
    }
}

impl Paginator for SelectorPaginator {
    fn next_page(&self, current_url: &str, doc: &Html) -> Result<Option<String>, PaginateError> {
        let href = doc
            .select(&self.selector)
            .next()
            .and_then(|el| el.value().attr(&self.attribute))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        let Some(href) = href else {
            return Ok(None);
        };

        resolve_href(current_url, href)
            .map(Some)
            .map_err(|source| PaginateError::InvalidUrl {
                url: current_url.to_string(),
                source,
            })
    }
}
