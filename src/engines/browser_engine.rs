// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetcherSettings;
use crate::domain::models::session::Session;
use crate::engines::traits::{FetchError, FetchKind, FetchRequest, FetchResponse, Fetcher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// 浏览器抓取引擎
///
/// 基于 chromiumoxide 渲染页面。浏览器在第一次抓取时启动（或连接远程实例），
/// 归属于引擎实例本身，不在任务之间共享
pub struct BrowserEngine {
    browser: OnceCell<Browser>,
    user_agent: String,
    timeout: Duration,
    remote_url: Option<String>,
}

impl BrowserEngine {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            browser: OnceCell::new(),
            user_agent: user_agent.into(),
            timeout,
            remote_url: None,
        }
    }

    /// 连接已运行的浏览器而不是启动本地实例
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    pub fn from_settings(settings: &FetcherSettings) -> Self {
        let engine = Self::new(
            settings.user_agent.clone(),
            Duration::from_secs(settings.timeout_secs),
        );
        match &settings.browser_ws_url {
            Some(url) => engine.with_remote_url(url.clone()),
            None => engine,
        }
    }

    async fn browser(&self) -> Result<&Browser, FetchError> {
        self.browser
            .get_or_try_init(|| async {
                let (browser, mut handler) = match &self.remote_url {
                    Some(url) => {
                        info!("Connecting to remote Chrome instance at: {}", url);
                        Browser::connect(url.as_str()).await.map_err(|e| {
                            FetchError::Other(format!("Failed to connect to remote Chrome: {}", e))
                        })?
                    }
                    None => {
                        let config = BrowserConfig::builder()
                            .no_sandbox()
                            .request_timeout(self.timeout)
                            .arg("--disable-gpu")
                            .arg("--disable-dev-shm-usage")
                            .build()
                            .map_err(FetchError::Other)?;
                        Browser::launch(config)
                            .await
                            .map_err(|e| FetchError::Other(e.to_string()))?
                    }
                };

                // 处理浏览器事件
                tokio::spawn(async move {
                    while let Some(h) = handler.next().await {
                        if h.is_err() {
                            break;
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }

    async fn open_page(&self) -> Result<Page, FetchError> {
        self.browser()
            .await?
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Other(e.to_string()))
    }

    async fn render(
        &self,
        page: &Page,
        request: &FetchRequest,
        session: &Session,
    ) -> Result<FetchResponse, FetchError> {
        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| FetchError::Other(e.to_string()))?;

        if session.has_cookies() {
            let cookies = session_cookies(&session.cookies, &request.url)?;
            page.set_cookies(cookies)
                .await
                .map_err(|e| FetchError::Other(e.to_string()))?;
        }

        page.goto(request.url.as_str())
            .await
            .map_err(|e| FetchError::Other(e.to_string()))?;

        let content = page
            .content()
            .await
            .map_err(|e| FetchError::Other(e.to_string()))?;
        let url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| request.url.clone());

        let cookies = match page.get_cookies().await {
            Ok(cookies) => {
                let jar = cookies
                    .iter()
                    .map(|c| format!("{}={}", c.name, c.value))
                    .collect::<Vec<_>>()
                    .join("; ");
                (jar != session.cookies).then_some(jar)
            }
            Err(e) => {
                warn!("Failed to read cookies for {}: {}", request.url, e);
                None
            }
        };

        // chromiumoxide 的 goto 不返回响应状态，页面加载成功即视为 200
        Ok(FetchResponse {
            url,
            status_code: 200,
            content,
            cookies,
        })
    }
}

/// 限时执行，超时映射为 `FetchError::Timeout`
async fn bounded<T, F>(limit: Duration, work: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| FetchError::Timeout)?
}

/// 把会话 Cookie 转换为浏览器 Cookie 参数
fn session_cookies(cookies: &str, url: &str) -> Result<Vec<CookieParam>, FetchError> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| {
            CookieParam::builder()
                .name(name.trim())
                .value(value.trim())
                .url(url)
                .build()
                .map_err(FetchError::Other)
        })
        .collect()
}

#[async_trait]
impl Fetcher for BrowserEngine {
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

        let page = bounded(self.timeout, self.open_page()).await?;

        // 标签页在超时之外关闭，渲染超时也不会遗留
        let result = bounded(self.timeout, self.render(&page, request, session)).await;
        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", request.url, e);
        }
        result
    }

    fn supports(&self, kind: FetchKind) -> bool {
        kind == FetchKind::Browser
    }

    fn name(&self) -> &'static str {
        "browser"
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
