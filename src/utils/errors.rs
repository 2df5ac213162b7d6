// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::FetchError;
use thiserror::Error;

/// 配置错误类型
///
/// 在构建抓取计划（Scraper）时产生，属于致命错误，会阻止任务创建
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置中没有任何字段")]
    NoParts,

    #[error("第 {0} 个字段缺少名称")]
    MissingName(usize),

    #[error("字段 {0} 缺少选择器")]
    MissingSelector(String),

    #[error("字段名称重复: {0}")]
    DuplicateName(String),

    #[error("无效的选择器 {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("无效的正则表达式 {pattern}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("字段 {field} 的提取器参数无效: {reason}")]
    InvalidParams { field: String, reason: String },

    #[error("未知的提取器类型: {0}")]
    UnknownExtractor(String),

    #[error("详情嵌套层级超过上限 {0}")]
    DetailsTooDeep(usize),

    #[error("负载解析失败: {0}")]
    Payload(String),
}

/// 提取器错误类型
///
/// 提取器执行失败时产生，会中止整个抓取任务
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("未提供属性名称")]
    MissingAttribute,

    #[error("正则表达式没有捕获组")]
    NoSubexpressions,

    #[error("无效的捕获组序号 {index}（共 {available} 个）")]
    InvalidSubexpression { index: usize, available: usize },
}

/// 字段提取失败，附带失败的字段名称
#[derive(Error, Debug, Clone)]
#[error("字段 {part} 提取失败: {source}")]
pub struct PartFailure {
    pub part: String,
    #[source]
    pub source: ExtractError,
}

/// 翻页错误类型
#[derive(Error, Debug)]
pub enum PaginateError {
    #[error("无效的页面地址 {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// 抓取任务错误类型
///
/// 汇总抓取过程中各阶段的错误，任务失败时已收集的结果仍然保留
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("未提供起始 URL")]
    MissingUrl,

    #[error("抓取 {url} 失败: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("提取 {url} 失败: {source}")]
    Extract {
        url: String,
        #[source]
        source: PartFailure,
    },

    #[error("计算 {url} 的下一页失败: {source}")]
    Paginate {
        url: String,
        #[source]
        source: PaginateError,
    },

    #[error("详情页 {url} 抓取失败: {source}")]
    Details {
        url: String,
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    /// 判断错误是否发生在抓取（网络）阶段
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, ScrapeError::Fetch { .. })
    }

    /// 错误类别，用作指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::MissingUrl => "missing_url",
            ScrapeError::Fetch { .. } => "fetch",
            ScrapeError::Extract { .. } => "extract",
            ScrapeError::Paginate { .. } => "paginate",
            ScrapeError::Details { .. } => "details",
        }
    }
}
