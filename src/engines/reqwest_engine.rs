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

use crate::config::settings::FetcherSettings;
use crate::domain::models::session::{merge_set_cookies, Session};
use crate::engines::traits::{FetchError, FetchKind, FetchRequest, FetchResponse, Fetcher};
use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use std::time::Duration;
use tracing::debug;

/// HTTP 抓取引擎
///
/// 基于 reqwest 实现。客户端不启用 Cookie 罐，Cookie 完全由会话携带
pub struct ReqwestEngine {
    client: reqwest::Client,
    user_agent: String,
}

impl ReqwestEngine {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let user_agent = user_agent.into();
        let client = reqwest::Client::builder()
            .user_agent(user_agent.as_str())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, user_agent })
    }

    pub fn from_settings(settings: &FetcherSettings) -> Result<Self, FetchError> {
        Self::new(
            settings.user_agent.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::RequestFailed(e)
    }
}

#[async_trait]
impl Fetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// 非 2xx 状态码原样返回，由调用方决定是否视为失败
    async fn fetch(
        &self,
        request: &FetchRequest,
        session: &Session,
    ) -> Result<FetchResponse, FetchError> {
        if let Some(robots) = &session.robots {
            if !robots.is_allowed(&request.url, &self.user_agent) {
                return Err(FetchError::Disallowed(request.url.clone()));
            }
        }

        let mut builder = self.client.get(&request.url);
        if session.has_cookies() {
            builder = builder.header(COOKIE, session.cookies.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status_code = response.status().as_u16();
        let url = response.url().to_string();

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let cookies = if set_cookies.is_empty() {
            None
        } else {
            let merged = merge_set_cookies(&session.cookies, set_cookies.iter().map(String::as_str));
            (merged != session.cookies).then_some(merged)
        };

        let content = response.text().await.map_err(map_reqwest_error)?;
        debug!("Fetched {} ({}), {} bytes", url, status_code, content.len());

        Ok(FetchResponse {
            url,
            status_code,
            content,
            cookies,
        })
    }

    fn supports(&self, kind: FetchKind) -> bool {
        kind == FetchKind::Http
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
