// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;

use super::extractor::{AttrExtractor, Extractor, TextExtractor};
use super::params::Params;

/// 链接提取器：可见文本 + href 属性
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkExtractor {
    pub text: TextExtractor,
    pub href: AttrExtractor,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self {
            text: TextExtractor::default(),
            href: AttrExtractor::new("href"),
        }
    }
}

impl Params for LinkExtractor {
    const KEYS: &'static [&'static str] = &["text", "href"];
}

impl LinkExtractor {
    /// 拆分为 `_text` 和 `_link` 两个提取器
    pub fn split(mut self) -> (Extractor, Extractor) {
        if self.href.attr.is_empty() {
            self.href.attr = "href".to_string();
        }
        (Extractor::Text(self.text), Extractor::Attr(self.href))
    }
}

/// 图片提取器：src 与 alt 属性
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageExtractor {
    pub src: AttrExtractor,
    pub alt: AttrExtractor,
}

impl Default for ImageExtractor {
    fn default() -> Self {
        Self {
            src: AttrExtractor::new("src"),
            alt: AttrExtractor::new("alt"),
        }
    }
}

impl Params for ImageExtractor {
    const KEYS: &'static [&'static str] = &["src", "alt"];
}

impl ImageExtractor {
    /// 拆分为 `_src` 和 `_alt` 两个提取器
    pub fn split(mut self) -> (Extractor, Extractor) {
        if self.src.attr.is_empty() {
            self.src.attr = "src".to_string();
        }
        if self.alt.attr.is_empty() {
            self.alt.attr = "alt".to_string();
        }
        (Extractor::Attr(self.src), Extractor::Attr(self.alt))
    }
}
