// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::settings::ScrapeSettings;

/// 输出格式标签
///
/// 序列化本身不在本库范围内，这里只记录调用方请求的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Jsonl,
    Csv,
    Xml,
    Xlsx,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            "xlsx" => Ok(OutputFormat::Xlsx),
            _ => Err(()),
        }
    }
}

/// 抓取选项
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOptions {
    /// 最大页数，0 表示不限制
    pub max_pages: u32,
    /// 输出格式
    pub format: OutputFormat,
    /// 是否按页分组输出结果
    pub paginate_results: bool,
    /// 两次抓取之间的间隔
    pub fetch_delay: Duration,
    /// 在 [0.5, 1.5) 倍之间随机化抓取间隔
    pub randomize_fetch_delay: bool,
    /// 抓取失败时的额外重试次数
    pub retry_times: u32,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_pages: 0,
            format: OutputFormat::Json,
            paginate_results: true,
            fetch_delay: Duration::ZERO,
            randomize_fetch_delay: false,
            retry_times: 0,
        }
    }
}

impl From<&ScrapeSettings> for ScrapeOptions {
    fn from(settings: &ScrapeSettings) -> Self {
        Self {
            max_pages: settings.max_pages,
            format: settings.format.parse().unwrap_or_else(|_| {
                tracing::warn!(format = %settings.format, "Unknown output format, falling back to json");
                OutputFormat::Json
            }),
            paginate_results: settings.paginate_results,
            fetch_delay: Duration::from_millis(settings.fetch_delay_ms),
            randomize_fetch_delay: settings.randomize_fetch_delay,
            retry_times: settings.retry_times,
        }
    }
}

impl ScrapeOptions {
    /// 计算本次抓取前的等待时间
    ///
    /// robots.txt 的 Crawl-delay 大于配置值时以 Crawl-delay 为准
    pub fn delay(&self, crawl_delay: Option<Duration>) -> Duration {
        let base = if self.randomize_fetch_delay && !self.fetch_delay.is_zero() {
            let factor: f64 = rand::random_range(0.5..1.5);
            // 超出 Duration 表示范围时保持原值
            Duration::try_from_secs_f64(self.fetch_delay.as_secs_f64() * factor)
                .unwrap_or(self.fetch_delay)
        } else {
            self.fetch_delay
        };
        match crawl_delay {
            Some(crawl_delay) if crawl_delay > base => crawl_delay,
            _ => base,
        }
    }
}
