// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::extract::{Extractor, Selection};
use crate::domain::models::options::ScrapeOptions;
use crate::domain::models::payload::Payload;
use crate::domain::services::field_compiler::FieldCompiler;
use crate::domain::services::page_divider::PageDivider;
use crate::domain::services::paginator::Paginator;
use crate::utils::errors::ConfigError;

/// 代表区块本身的选择器
pub const SELF_SELECTOR: &str = ".";

/// 字段提取规则
///
/// 名称 + 选择器 + 提取器，可选地挂载详情页的子抓取计划
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub selector: String,
    compiled: Option<Selector>,
    pub extractor: Extractor,
    pub details: Option<Arc<Scraper>>,
}

impl Part {
    pub fn new(
        name: impl Into<String>,
        selector: impl Into<String>,
        extractor: Extractor,
    ) -> Result<Self, ConfigError> {
        let selector = selector.into();
        let compiled = if selector.is_empty() || selector == SELF_SELECTOR {
            None
        } else {
            Some(parse_selector(&selector)?)
        };
        Ok(Self {
            name: name.into(),
            selector,
            compiled,
            extractor,
            details: None,
        })
    }

    pub fn with_details(mut self, details: Arc<Scraper>) -> Self {
        self.details = Some(details);
        self
    }

    /// 在区块内选择节点，"." 直接使用区块本身
    pub fn select<'a>(&self, block: ElementRef<'a>) -> Selection<'a> {
        match &self.compiled {
            Some(selector) => Selection::within(block, selector),
            None => Selection::of(block),
        }
    }
}

/// 解析 CSS 选择器
pub fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// 校验字段列表：非空、名称非空且唯一、选择器非空
pub fn validate_parts(parts: &[Part]) -> Result<(), ConfigError> {
    if parts.is_empty() {
        return Err(ConfigError::NoParts);
    }

    let mut seen = HashSet::new();
    for (idx, part) in parts.iter().enumerate() {
        if part.name.is_empty() {
            return Err(ConfigError::MissingName(idx));
        }
        if part.selector.is_empty() {
            return Err(ConfigError::MissingSelector(part.name.clone()));
        }
        if !seen.insert(part.name.as_str()) {
            return Err(ConfigError::DuplicateName(part.name.clone()));
        }
    }
    Ok(())
}

/// 抓取计划
///
/// 构建后只读，可以在多个并发任务之间通过 `Arc` 共享
pub struct Scraper {
    pub paginator: Box<dyn Paginator>,
    pub divider: PageDivider,
    pub parts: Vec<Part>,
    pub opts: ScrapeOptions,
}

impl fmt::Debug for Scraper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scraper")
            .field("divider", &self.divider)
            .field("parts", &self.parts)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Scraper {
    /// 使用默认选项编译负载
    pub fn new(payload: &Payload) -> Result<Self, ConfigError> {
        FieldCompiler::default().compile(payload)
    }

    /// 直接由各组成部分构建，同样执行字段校验
    pub fn from_parts(
        parts: Vec<Part>,
        divider: PageDivider,
        paginator: Box<dyn Paginator>,
        opts: ScrapeOptions,
    ) -> Result<Self, ConfigError> {
        validate_parts(&parts)?;
        Ok(Self {
            paginator,
            divider,
            parts,
            opts,
        })
    }

    /// 生成的字段名称，按声明顺序
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }
}
