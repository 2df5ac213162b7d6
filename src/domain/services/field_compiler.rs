// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::debug;

use crate::domain::extract::extractor::{
    AttrExtractor, ConstExtractor, CountExtractor, HtmlExtractor, OuterHtmlExtractor,
    RegexExtractor, RegexParams, TextExtractor,
};
use crate::domain::extract::params::decode;
use crate::domain::extract::{Extractor, ExtractorKind, ImageExtractor, LinkExtractor};
use crate::domain::models::options::ScrapeOptions;
use crate::domain::models::payload::{FieldSpec, Payload};
use crate::domain::models::scraper::{parse_selector, Part, Scraper, SELF_SELECTOR};
use crate::domain::services::page_divider::PageDivider;
use crate::domain::services::paginator::{NoopPaginator, Paginator, SelectorPaginator};
use crate::utils::errors::ConfigError;

/// 详情页嵌套的最大层级
pub const MAX_DETAILS_DEPTH: usize = 2;

/// 字段编译器
///
/// 将负载中的字段描述编译为抓取计划：展开组合字段、解码提取器参数、
/// 校验字段并构建页面划分器与翻页器
#[derive(Debug, Clone, Default)]
pub struct FieldCompiler {
    defaults: ScrapeOptions,
}

impl FieldCompiler {
    /// 负载未设置的选项使用给定的默认值
    pub fn with_defaults(defaults: ScrapeOptions) -> Self {
        Self { defaults }
    }

    pub fn compile(&self, payload: &Payload) -> Result<Scraper, ConfigError> {
        self.compile_at(payload, 0)
    }

    fn compile_at(&self, payload: &Payload, depth: usize) -> Result<Scraper, ConfigError> {
        let mut parts = Vec::new();
        let mut selectors: Vec<&str> = Vec::new();

        for field in &payload.fields {
            self.compile_field(field, depth, &mut parts)?;

            // 每个字段只登记一次选择器，"." 不参与页面划分
            let selector = field.selector.as_str();
            if !selector.is_empty() && selector != SELF_SELECTOR && !selectors.contains(&selector) {
                selectors.push(selector);
            }
        }

        let divider = PageDivider::from_selectors(
            selectors
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>, _>>()?,
        );

        let paginator: Box<dyn Paginator> = match &payload.paginator {
            None => Box::new(NoopPaginator),
            Some(spec) => Box::new(SelectorPaginator::new(
                parse_selector(&spec.selector)?,
                spec.attribute.clone(),
            )),
        };

        let scraper = Scraper::from_parts(parts, divider, paginator, payload.options(&self.defaults))?;
        debug!(
            "Compiled payload '{}' at depth {} into parts {:?}",
            payload.name,
            depth,
            scraper.part_names()
        );
        Ok(scraper)
    }

    fn compile_field(
        &self,
        field: &FieldSpec,
        depth: usize,
        parts: &mut Vec<Part>,
    ) -> Result<(), ConfigError> {
        if field.name.is_empty() {
            return Err(ConfigError::MissingName(parts.len()));
        }

        let details = match &field.details {
            None => None,
            Some(_) if depth >= MAX_DETAILS_DEPTH => {
                return Err(ConfigError::DetailsTooDeep(MAX_DETAILS_DEPTH));
            }
            Some(details) => Some(Arc::new(self.compile_at(details, depth + 1)?)),
        };

        let kind: ExtractorKind = field.extractor.kind.parse()?;
        let params = field.extractor.params.as_ref();
        let name = field.name.as_str();

        match kind {
            ExtractorKind::Link => {
                let (text, href) = decode::<LinkExtractor>(name, params)?.split();
                parts.push(Part::new(format!("{}_text", name), &field.selector, text)?);
                parts.push(attach(
                    Part::new(format!("{}_link", name), &field.selector, href)?,
                    details,
                ));
            }
            ExtractorKind::Image => {
                let (src, alt) = decode::<ImageExtractor>(name, params)?.split();
                parts.push(attach(
                    Part::new(format!("{}_src", name), &field.selector, src)?,
                    details,
                ));
                parts.push(Part::new(format!("{}_alt", name), &field.selector, alt)?);
            }
            simple => {
                let extractor = simple_extractor(simple, name, params)?;
                parts.push(attach(Part::new(name, &field.selector, extractor)?, details));
            }
        }
        Ok(())
    }
}

fn attach(part: Part, details: Option<Arc<Scraper>>) -> Part {
    match details {
        Some(details) => part.with_details(details),
        None => part,
    }
}

fn simple_extractor(
    kind: ExtractorKind,
    field: &str,
    params: Option<&serde_json::Value>,
) -> Result<Extractor, ConfigError> {
    let extractor = match kind {
        ExtractorKind::Const => Extractor::Const(decode::<ConstExtractor>(field, params)?),
        ExtractorKind::Count => Extractor::Count(decode::<CountExtractor>(field, params)?),
        ExtractorKind::Text => Extractor::Text(decode::<TextExtractor>(field, params)?),
        ExtractorKind::Html => Extractor::Html(decode::<HtmlExtractor>(field, params)?),
        ExtractorKind::OuterHtml => {
            Extractor::OuterHtml(decode::<OuterHtmlExtractor>(field, params)?)
        }
        ExtractorKind::Attr => Extractor::Attr(decode::<AttrExtractor>(field, params)?),
        ExtractorKind::Regex => {
            let params = decode::<RegexParams>(field, params)?;
            if params.regexp.is_empty() {
                return Err(ConfigError::InvalidParams {
                    field: field.to_string(),
                    reason: "regexp is required".to_string(),
                });
            }
            Extractor::Regex(RegexExtractor::try_from(params)?)
        }
        ExtractorKind::Link | ExtractorKind::Image => {
            return Err(ConfigError::InvalidParams {
                field: field.to_string(),
                reason: format!("{} is a composite extractor", kind),
            });
        }
    };
    Ok(extractor)
}

#[cfg(test)]
#[path = "field_compiler_test.rs"]
mod tests;
