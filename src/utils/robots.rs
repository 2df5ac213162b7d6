// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::utils::retry_policy::RetryPolicy;

/// 已解析的 robots.txt 策略
///
/// 保存在会话中，由抓取引擎在发送请求前查询
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    content: String,
}

impl RobotsPolicy {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// 允许所有访问的空策略
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 检查URL是否被允许访问
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }

    /// 解析Crawl-delay指令
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        // 逻辑：
        // 1. 找到匹配的 User-agent 块
        // 2. 在块内查找 Crawl-delay
        let user_agent = user_agent.to_lowercase();
        let mut current_agent_matched = false;
        let mut delay: Option<f64> = None;
        let mut specific_agent_found = false;

        for line in self.content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if value == "*" {
                        current_agent_matched = !specific_agent_found;
                    } else if user_agent.contains(&value.to_lowercase()) {
                        current_agent_matched = true;
                        specific_agent_found = true;
                        // Reset delay if we found a more specific agent
                        delay = None;
                    } else {
                        current_agent_matched = false;
                    }
                }
                "crawl-delay" if current_agent_matched => {
                    if let Ok(d) = value.parse::<f64>() {
                        delay = Some(d);
                    }
                }
                _ => {}
            }
        }

        delay
            .filter(|d| d.is_finite() && *d >= 0.0)
            .and_then(|d| Duration::try_from_secs_f64(d).ok())
    }
}

/// 从 User-Agent 中提取 robots.txt 使用的产品标识
///
/// `Mozilla/5.0 (compatible; blockscrape/0.1)` -> `blockscrape`
fn product_token(user_agent: &str) -> &str {
    let tail = match user_agent.find("compatible;") {
        Some(pos) => &user_agent[pos + "compatible;".len()..],
        None => user_agent,
    };
    let tail = tail.trim_start();
    let end = tail
        .find(|c: char| c == '/' || c == ';' || c == ')' || c.is_whitespace())
        .unwrap_or(tail.len());
    &tail[..end]
}

/// robots.txt 策略提供者接口
#[async_trait]
pub trait RobotsProvider: Send + Sync {
    /// 获取URL所在站点的策略，None 表示不限制
    async fn policy_for(&self, url_str: &str) -> Result<Option<RobotsPolicy>>;
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    policy: RobotsPolicy,
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 通过 HTTP 拉取 robots.txt，并在内存中缓存一小时
#[derive(Clone)]
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 内存缓存
    memory_cache: Arc<Mutex<HashMap<String, CachedRobots>>>,

    /// 重试策略
    retry_policy: RetryPolicy,

    user_agent: String,
}

impl Default for RobotsChecker {
    fn default() -> Self {
        Self::new(crate::engines::traits::DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl RobotsProvider for RobotsChecker {
    async fn policy_for(&self, url_str: &str) -> Result<Option<RobotsPolicy>> {
        let policy = self.get_robots_policy(url_str).await?;
        Ok(Some(policy))
    }
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            memory_cache: Arc::new(Mutex::new(HashMap::new())),
            retry_policy: RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_secs(2),
                max_backoff: Duration::from_secs(10),
                ..Default::default()
            },
            user_agent: user_agent.into(),
        }
    }

    /// 设置重试策略
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// robots.txt 的地址
    fn robots_url(url_str: &str) -> Result<String> {
        let url = Url::parse(url_str)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid URL: {}", url_str))?;
        let port = url.port_or_known_default().unwrap_or(80);
        Ok(format!("{}://{}:{}/robots.txt", url.scheme(), host, port))
    }

    /// 拉取一次 robots.txt
    ///
    /// 4xx 表示站点没有可用的 robots.txt，返回空内容；5xx、网络错误与响应体读取失败可重试
    async fn fetch_robots(&self, robots_url: &str) -> Result<String> {
        let resp = self
            .client
            .get(robots_url)
            .header("User-Agent", &self.user_agent)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Request failed: {}", e))?;

        let status = resp.status();
        if status.is_server_error() {
            anyhow::bail!("Server error: {}", status);
        }
        if !status.is_success() {
            return Ok(String::new());
        }
        resp.text()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read body: {}", e))
    }

    /// 获取Robots.txt策略（带缓存）
    async fn get_robots_policy(&self, url_str: &str) -> Result<RobotsPolicy> {
        let robots_url = Self::robots_url(url_str)?;

        {
            let mut cache = self.memory_cache.lock();
            if let Some(cached) = cache.get(&robots_url) {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.policy.clone());
                }
                cache.remove(&robots_url);
            }
        }

        let mut attempt = 0;
        let content = loop {
            match self.fetch_robots(&robots_url).await {
                Ok(content) => break content,
                Err(e) if self.retry_policy.should_retry(attempt) => {
                    attempt += 1;
                    let backoff = self.retry_policy.calculate_backoff(attempt);
                    tracing::debug!(
                        "Fetching {} failed: {}. Retry {}/{} in {:?}",
                        robots_url, e, attempt, self.retry_policy.max_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
                    break String::new();
                }
            }
        };

        let policy = RobotsPolicy::new(content);
        self.memory_cache.lock().insert(
            robots_url,
            CachedRobots {
                policy: policy.clone(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            },
        );

        Ok(policy)
    }
}
