// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetcherSettings;
use crate::domain::models::session::Session;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{
    FetchError, FetchKind, FetchRequest, FetchResponse, Fetcher, DEFAULT_USER_AGENT,
};
use crate::infrastructure::metrics;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 引擎路由器
///
/// 按请求类型把请求分派给第一个支持它的引擎
pub struct FetcherRouter {
    fetchers: Vec<Arc<dyn Fetcher>>,
}

impl FetcherRouter {
    pub fn new(fetchers: Vec<Arc<dyn Fetcher>>) -> Self {
        Self { fetchers }
    }

    /// 根据配置创建路由器
    ///
    /// 总是包含 HTTP 引擎；启用 browser 特性时追加浏览器引擎
    pub fn from_settings(settings: &FetcherSettings) -> Result<Self, FetchError> {
        #[allow(unused_mut)]
        let mut fetchers: Vec<Arc<dyn Fetcher>> =
            vec![Arc::new(ReqwestEngine::from_settings(settings)?)];

        #[cfg(feature = "browser")]
        fetchers.push(Arc::new(
            crate::engines::browser_engine::BrowserEngine::from_settings(settings),
        ));

        Ok(Self::new(fetchers))
    }

    fn route(&self, kind: FetchKind) -> Option<&Arc<dyn Fetcher>> {
        self.fetchers.iter().find(|f| f.supports(kind))
    }
}

#[async_trait]
impl Fetcher for FetcherRouter {
    async fn fetch(
        &self,
        request: &FetchRequest,
        session: &Session,
    ) -> Result<FetchResponse, FetchError> {
        let fetcher = self
            .route(request.kind)
            .ok_or(FetchError::Unsupported(request.kind))?;
        debug!("Routing {} request for {} to {}", request.kind, request.url, fetcher.name());
        let response = fetcher.fetch(request, session).await?;
        if response.is_success() {
            metrics::record_page_fetched(fetcher.name());
        }
        Ok(response)
    }

    fn supports(&self, kind: FetchKind) -> bool {
        self.route(kind).is_some()
    }

    fn name(&self) -> &'static str {
        "router"
    }

    fn user_agent(&self) -> &str {
        self.fetchers
            .first()
            .map(|f| f.user_agent())
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}
