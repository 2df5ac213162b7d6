// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::params::Params;
use super::selection::{node_text, Selection};
use crate::utils::errors::{ConfigError, ExtractError};

/// 提取器特质
///
/// 从区块内的节点集合中取值：`Ok(None)` 表示该字段在区块中不存在，
/// `Err` 表示提取失败并会中止整个抓取任务
pub trait Extract {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError>;
}

/// 提取器类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Const,
    Count,
    Text,
    Html,
    OuterHtml,
    Attr,
    Regex,
    Link,
    Image,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            ExtractorKind::Const => "const",
            ExtractorKind::Count => "count",
            ExtractorKind::Text => "text",
            ExtractorKind::Html => "html",
            ExtractorKind::OuterHtml => "outerHtml",
            ExtractorKind::Attr => "attr",
            ExtractorKind::Regex => "regex",
            ExtractorKind::Link => "link",
            ExtractorKind::Image => "image",
        };
        write!(f, "{}", tag)
    }
}

impl FromStr for ExtractorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "const" => Ok(ExtractorKind::Const),
            "count" => Ok(ExtractorKind::Count),
            "text" => Ok(ExtractorKind::Text),
            "html" => Ok(ExtractorKind::Html),
            "outerHtml" => Ok(ExtractorKind::OuterHtml),
            "attr" => Ok(ExtractorKind::Attr),
            "regex" => Ok(ExtractorKind::Regex),
            "link" => Ok(ExtractorKind::Link),
            "image" => Ok(ExtractorKind::Image),
            other => Err(ConfigError::UnknownExtractor(other.to_string())),
        }
    }
}

/// 常量提取器，总是返回配置的值
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstExtractor {
    #[serde(alias = "val")]
    pub value: Value,
}

impl Params for ConstExtractor {
    const KEYS: &'static [&'static str] = &["value", "val"];
}

impl Extract for ConstExtractor {
    fn extract(&self, _selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        if self.value.is_null() {
            return Ok(None);
        }
        Ok(Some(self.value.clone()))
    }
}

/// 计数提取器，返回匹配节点数
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CountExtractor {}

impl Params for CountExtractor {
    const KEYS: &'static [&'static str] = &[];
}

impl Extract for CountExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        Ok(Some(Value::from(selection.len())))
    }
}

/// 文本提取器
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TextExtractor {
    /// 没有匹配节点时仍然返回空字符串
    pub include_if_empty: bool,
}

impl Params for TextExtractor {
    const KEYS: &'static [&'static str] = &["includeIfEmpty"];
}

impl Extract for TextExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        if selection.is_empty() && !self.include_if_empty {
            return Ok(None);
        }
        Ok(Some(Value::String(selection.text())))
    }
}

/// 内部 HTML 提取器（第一个匹配节点）
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HtmlExtractor {}

impl Params for HtmlExtractor {
    const KEYS: &'static [&'static str] = &[];
}

impl Extract for HtmlExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        Ok(selection
            .first()
            .map(|node| Value::String(node.inner_html())))
    }
}

/// 外部 HTML 提取器（第一个匹配节点，含标签本身）
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OuterHtmlExtractor {}

impl Params for OuterHtmlExtractor {
    const KEYS: &'static [&'static str] = &[];
}

impl Extract for OuterHtmlExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        Ok(selection.first().map(|node| Value::String(node.html())))
    }
}

/// 属性提取器
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AttrExtractor {
    /// 属性名称，为空时提取失败
    pub attr: String,
    /// 返回所有匹配节点的属性值
    pub allow_multiple: bool,
    pub include_if_empty: bool,
}

impl AttrExtractor {
    pub fn new(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            ..Default::default()
        }
    }
}

impl Params for AttrExtractor {
    const KEYS: &'static [&'static str] = &["attr", "allowMultiple", "includeIfEmpty"];
}

impl Extract for AttrExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        if self.attr.is_empty() {
            return Err(ExtractError::MissingAttribute);
        }

        let values: Vec<String> = selection
            .iter()
            .filter_map(|node| node.value().attr(&self.attr))
            .map(|v| v.trim().to_string())
            .collect();

        Ok(collect_strings(values, self.allow_multiple, self.include_if_empty))
    }
}

/// 正则表达式参数
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegexParams {
    pub regexp: String,
    /// 返回的捕获组序号，0 表示第一个捕获组
    pub subexpression: usize,
    /// 只匹配文本而不是 HTML
    pub only_text: bool,
    pub allow_multiple: bool,
    pub include_if_empty: bool,
}

impl Params for RegexParams {
    const KEYS: &'static [&'static str] = &[
        "regexp",
        "subexpression",
        "onlyText",
        "allowMultiple",
        "includeIfEmpty",
    ];
}

/// 正则表达式提取器
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pub regex: Regex,
    pub subexpression: usize,
    pub only_text: bool,
    pub allow_multiple: bool,
    pub include_if_empty: bool,
}

impl TryFrom<RegexParams> for RegexExtractor {
    type Error = ConfigError;

    fn try_from(params: RegexParams) -> Result<Self, Self::Error> {
        let regex = Regex::new(&params.regexp).map_err(|source| ConfigError::InvalidRegex {
            pattern: params.regexp.clone(),
            source,
        })?;
        Ok(Self {
            regex,
            subexpression: params.subexpression,
            only_text: params.only_text,
            allow_multiple: params.allow_multiple,
            include_if_empty: params.include_if_empty,
        })
    }
}

impl Extract for RegexExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        let available = self.regex.captures_len() - 1;
        if available == 0 {
            return Err(ExtractError::NoSubexpressions);
        }
        let index = self.subexpression.max(1);
        if index > available {
            return Err(ExtractError::InvalidSubexpression { index, available });
        }

        let mut values = Vec::new();
        'nodes: for node in selection.iter() {
            let content = if self.only_text {
                node_text(node)
            } else {
                node.inner_html()
            };
            for caps in self.regex.captures_iter(&content) {
                if let Some(m) = caps.get(index) {
                    values.push(m.as_str().to_string());
                    if !self.allow_multiple {
                        break 'nodes;
                    }
                }
            }
        }

        Ok(collect_strings(values, self.allow_multiple, self.include_if_empty))
    }
}

/// 多值提取器的公共收尾逻辑
fn collect_strings(values: Vec<String>, allow_multiple: bool, include_if_empty: bool) -> Option<Value> {
    if values.is_empty() && !include_if_empty {
        return None;
    }
    if allow_multiple {
        return Some(Value::Array(values.into_iter().map(Value::String).collect()));
    }
    Some(Value::String(values.into_iter().next().unwrap_or_default()))
}

/// 提取器注册表
///
/// 封闭的提取器集合；组合类型（link、image）在编译字段时拆分为两个简单提取器
#[derive(Debug, Clone)]
pub enum Extractor {
    Const(ConstExtractor),
    Count(CountExtractor),
    Text(TextExtractor),
    Html(HtmlExtractor),
    OuterHtml(OuterHtmlExtractor),
    Attr(AttrExtractor),
    Regex(RegexExtractor),
}

impl Extractor {
    pub fn kind(&self) -> ExtractorKind {
        match self {
            Extractor::Const(_) => ExtractorKind::Const,
            Extractor::Count(_) => ExtractorKind::Count,
            Extractor::Text(_) => ExtractorKind::Text,
            Extractor::Html(_) => ExtractorKind::Html,
            Extractor::OuterHtml(_) => ExtractorKind::OuterHtml,
            Extractor::Attr(_) => ExtractorKind::Attr,
            Extractor::Regex(_) => ExtractorKind::Regex,
        }
    }
}

impl Extract for Extractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<Option<Value>, ExtractError> {
        match self {
            Extractor::Const(e) => e.extract(selection),
            Extractor::Count(e) => e.extract(selection),
            Extractor::Text(e) => e.extract(selection),
            Extractor::Html(e) => e.extract(selection),
            Extractor::OuterHtml(e) => e.extract(selection),
            Extractor::Attr(e) => e.extract(selection),
            Extractor::Regex(e) => e.extract(selection),
        }
    }
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
