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

use crate::domain::models::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; blockscrape/0.1)";

/// 抓取引擎错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 非成功状态码
    #[error("Unexpected status code: {0}")]
    Status(u16),
    /// robots.txt 禁止访问
    #[error("Disallowed by robots.txt: {0}")]
    Disallowed(String),
    /// 没有引擎支持该请求类型
    #[error("No engine supports {0} requests")]
    Unsupported(FetchKind),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Timeout => true,
            FetchError::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

/// 请求类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    /// 普通 HTTP 请求
    #[default]
    #[serde(alias = "base")]
    Http,
    /// 无头浏览器请求
    #[serde(alias = "chrome")]
    Browser,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchKind::Http => write!(f, "http"),
            FetchKind::Browser => write!(f, "browser"),
        }
    }
}

/// 抓取请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// 目标URL
    #[serde(default)]
    pub url: String,
    /// 请求类型
    #[serde(default, rename = "type")]
    pub kind: FetchKind,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, kind: FetchKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// 以相同的请求类型指向另一个URL
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: self.kind,
        }
    }
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// 最终URL（跟随重定向之后）
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 更新后的 Cookie，None 表示会话 Cookie 不变
    pub cookies: Option<String>,
}

impl FetchResponse {
    /// 是否为成功状态码
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 抓取引擎特质
///
/// 每个任务应持有独立的引擎实例，引擎内部不得保存跨任务共享的可变状态（例如 Cookie 罐）
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 执行抓取
    ///
    /// 会话中的 Cookie 随请求发送，robots 策略由引擎自行检查
    async fn fetch(
        &self,
        request: &FetchRequest,
        session: &Session,
    ) -> Result<FetchResponse, FetchError>;

    /// 是否支持该请求类型
    fn supports(&self, kind: FetchKind) -> bool;

    /// 引擎名称
    fn name(&self) -> &'static str;

    /// 引擎使用的 User-Agent，用于匹配 robots.txt 规则
    fn user_agent(&self) -> &str {
        DEFAULT_USER_AGENT
    }
}
