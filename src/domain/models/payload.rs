// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::domain::models::options::{OutputFormat, ScrapeOptions};
use crate::engines::traits::FetchRequest;
use crate::utils::errors::ConfigError;

/// 抓取负载
///
/// 调用方提交的声明式抓取描述，由字段编译器转换为抓取计划
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// 负载名称，仅用于日志
    #[serde(default)]
    pub name: String,
    /// 起始请求
    #[serde(default)]
    pub request: FetchRequest,
    /// 字段描述列表
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// 翻页描述，为空时只抓取起始页
    #[serde(default)]
    pub paginator: Option<PaginatorSpec>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub paginate_results: Option<bool>,
    /// 抓取间隔（毫秒）
    #[serde(default)]
    pub fetch_delay: Option<u64>,
    #[serde(default)]
    pub randomize_fetch_delay: Option<bool>,
    #[serde(default)]
    pub retry_times: Option<u32>,
}

/// 字段描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub selector: String,
    pub extractor: ExtractorSpec,
    /// 详情页的嵌套抓取描述
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<Payload>>,
}

/// 提取器描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractorSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// 翻页描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatorSpec {
    pub selector: String,
    #[serde(default = "default_attribute")]
    pub attribute: String,
    /// 最大页数，0 表示不限制
    #[serde(default)]
    pub max_pages: u32,
}

fn default_attribute() -> String {
    "href".to_string()
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, selector: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            extractor: ExtractorSpec {
                kind: kind.into(),
                params: None,
            },
            details: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.extractor.params = Some(params);
        self
    }

    pub fn with_details(mut self, details: Payload) -> Self {
        self.details = Some(Box::new(details));
        self
    }
}

impl Payload {
    /// 从 JSON 文本解析
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Payload(e.to_string()))
    }

    /// 从 YAML 文本解析
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Payload(e.to_string()))
    }

    /// 从文件加载，按扩展名选择格式（.yaml/.yml 为 YAML，其余为 JSON）
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Payload(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// 以给定的默认选项为基础，叠加负载中显式设置的选项
    pub fn options(&self, defaults: &ScrapeOptions) -> ScrapeOptions {
        let mut opts = defaults.clone();
        if let Some(paginator) = &self.paginator {
            opts.max_pages = paginator.max_pages;
        }
        if let Some(format) = self.format {
            opts.format = format;
        }
        if let Some(paginate) = self.paginate_results {
            opts.paginate_results = paginate;
        }
        if let Some(delay) = self.fetch_delay {
            opts.fetch_delay = std::time::Duration::from_millis(delay);
        }
        if let Some(randomize) = self.randomize_fetch_delay {
            opts.randomize_fetch_delay = randomize;
        }
        if let Some(retry_times) = self.retry_times {
            opts.retry_times = retry_times;
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::traits::FetchKind;
    use std::time::Duration;

    const JSON: &str = r#"{
        "name": "books",
        "request": { "url": "https://books.toscrape.com/", "type": "chrome" },
        "fields": [
            { "name": "title", "selector": "h3 a", "extractor": { "type": "link" } },
            {
                "name": "price",
                "selector": ".price_color",
                "extractor": { "type": "regex", "params": { "regexp": "([\\d.]+)" } }
            }
        ],
        "paginator": { "selector": ".next a", "maxPages": 3 },
        "format": "csv",
        "fetchDelay": 500,
        "retryTimes": 2
    }"#;

    #[test]
    fn test_parse_json_payload() {
        let payload = Payload::from_json(JSON).unwrap();

        assert_eq!(payload.name, "books");
        assert_eq!(payload.request.kind, FetchKind::Browser);
        assert_eq!(payload.fields.len(), 2);
        assert_eq!(payload.fields[0].extractor.kind, "link");
        assert!(payload.fields[0].extractor.params.is_none());

        let paginator = payload.paginator.as_ref().unwrap();
        assert_eq!(paginator.attribute, "href");
        assert_eq!(paginator.max_pages, 3);
    }

    #[test]
    fn test_options_overlay_defaults() {
        let payload = Payload::from_json(JSON).unwrap();
        let defaults = ScrapeOptions {
            randomize_fetch_delay: true,
            ..Default::default()
        };
        let opts = payload.options(&defaults);

        assert_eq!(opts.max_pages, 3);
        assert_eq!(opts.format, OutputFormat::Csv);
        assert_eq!(opts.fetch_delay, Duration::from_millis(500));
        assert_eq!(opts.retry_times, 2);
        // 未设置的选项沿用默认值
        assert!(opts.randomize_fetch_delay);
        assert!(opts.paginate_results);
    }

    #[test]
    fn test_parse_yaml_payload_with_details() {
        let yaml = r#"
name: news
request:
  url: https://example.com/news
fields:
  - name: headline
    selector: .story a
    extractor:
      type: link
    details:
      fields:
        - name: body
          selector: article
          extractor:
            type: text
"#;
        let payload = Payload::from_yaml(yaml).unwrap();
        assert_eq!(payload.request.kind, FetchKind::Http);
        let details = payload.fields[0].details.as_ref().unwrap();
        assert_eq!(details.fields[0].name, "body");
        assert!(details.request.url.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_config_error() {
        let err = Payload::from_json("{ \"fields\": 3 }").unwrap_err();
        assert!(matches!(err, ConfigError::Payload(_)));
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.yml");
        std::fs::write(
            &path,
            "fields:\n  - name: t\n    selector: h1\n    extractor:\n      type: text\n",
        )
        .unwrap();

        let payload = Payload::from_path(&path).unwrap();
        assert_eq!(payload.fields[0].selector, "h1");
    }
}
