// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::engines::traits::DEFAULT_USER_AGENT;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub fetcher: FetcherSettings,
    pub scrape: ScrapeSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// 抓取引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// 是否遵守 robots.txt
    pub obey_robots: bool,
    /// 重试的初始退避时间（毫秒）
    pub retry_backoff_ms: u64,
    /// 远程浏览器的 WebSocket 地址，未设置时启动本地浏览器
    pub browser_ws_url: Option<String>,
}

/// 任务默认选项，负载中的同名字段优先
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeSettings {
    pub fetch_delay_ms: u64,
    pub randomize_fetch_delay: bool,
    pub retry_times: u32,
    /// 0 表示不限制页数
    pub max_pages: u32,
    pub paginate_results: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 导出地址，未设置时不导出
    pub listen_addr: Option<String>,
}

impl Settings {
    /// 加载配置
    ///
    /// 优先级：环境变量 > config/{APP_ENVIRONMENT} > config/default > 内置默认值
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("BLOCKSCRAPE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 从指定文件加载配置，缺省项使用内置默认值
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        // Fetcher defaults
        .set_default("fetcher.user_agent", DEFAULT_USER_AGENT)?
        .set_default("fetcher.timeout_secs", 30)?
        .set_default("fetcher.obey_robots", true)?
        .set_default("fetcher.retry_backoff_ms", 1000)?
        // Scrape defaults
        .set_default("scrape.fetch_delay_ms", 500)?
        .set_default("scrape.randomize_fetch_delay", true)?
        .set_default("scrape.retry_times", 2)?
        .set_default("scrape.max_pages", 0)?
        .set_default("scrape.paginate_results", true)?
        .set_default("scrape.format", "json")
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
