// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::{BoxFuture, FutureExt};
use scraper::Html;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::settings::Settings;
use crate::domain::models::results::{Block, Results};
use crate::domain::models::scraper::Scraper;
use crate::domain::models::session::Session;
use crate::domain::models::task::{Task, TaskStatus};
use crate::domain::services::extraction_pipeline::ExtractionPipeline;
use crate::engines::router::FetcherRouter;
use crate::engines::traits::{FetchError, FetchRequest, FetchResponse, Fetcher};
use crate::infrastructure::metrics;
use crate::utils::errors::{PaginateError, PartFailure, ScrapeError};
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::robots::{RobotsChecker, RobotsProvider};
use crate::utils::url_utils::resolve_href;

/// 单页处理状态
///
/// Fetching → Extracting → Advancing → {Fetching | Done | Failed}
enum PageState {
    Fetching(String),
    Extracting { url: String, response: FetchResponse },
    Advancing { url: String, page: ProcessedPage },
    Done,
    Failed { url: String, error: ScrapeError },
}

/// 已解析页面的产出，文档本身在此之前已释放
struct ProcessedPage {
    /// 跟随重定向后的地址，相对链接以此为基准
    base_url: String,
    records: Vec<Block>,
    next: Result<Option<String>, PaginateError>,
}

/// 抓取节奏控制：第一次抓取不等待，之后每次抓取前等待
#[derive(Debug, Default)]
struct Pacer {
    fetched: bool,
}

impl Pacer {
    async fn wait(&mut self, delay: Duration) {
        if self.fetched && !delay.is_zero() {
            debug!("Waiting {:?} before next fetch", delay);
            tokio::time::sleep(delay).await;
        }
        self.fetched = true;
    }
}

/// 翻页引擎
///
/// 驱动 抓取 → 划分 → 提取 → 翻页 的循环，直到没有下一页、达到页数上限或出错。
/// 同一任务内的页面严格顺序处理
pub struct PaginationEngine {
    fetcher: Arc<dyn Fetcher>,
    robots: Option<Arc<dyn RobotsProvider>>,
    retry_policy: RetryPolicy,
}

impl PaginationEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            robots: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// 启用 robots.txt 策略加载
    pub fn with_robots(mut self, robots: Arc<dyn RobotsProvider>) -> Self {
        self.robots = Some(robots);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// 根据配置构建引擎（HTTP 引擎，启用 browser 特性时附加浏览器引擎）
    ///
    /// 每个任务应使用独立的引擎实例
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let router = FetcherRouter::from_settings(&settings.fetcher)?;
        let mut engine = Self::new(Arc::new(router)).with_retry_policy(
            RetryPolicy::with_initial_backoff(Duration::from_millis(
                settings.fetcher.retry_backoff_ms,
            )),
        );
        if settings.fetcher.obey_robots {
            engine = engine.with_robots(Arc::new(RobotsChecker::new(
                settings.fetcher.user_agent.clone(),
            )));
        }
        Ok(engine)
    }

    /// 执行任务
    ///
    /// 失败时任务状态为 Failed，已收集的结果与访问记录保留在任务中
    #[instrument(skip(self, task), fields(task_id = %task.id, url = %task.request.url))]
    pub async fn run(&self, task: &mut Task) -> Result<(), ScrapeError> {
        if task.request.url.is_empty() {
            task.status = TaskStatus::Failed;
            task.results
                .record_visit("", Some(ScrapeError::MissingUrl.to_string()));
            metrics::record_task_failed(ScrapeError::MissingUrl.kind());
            return Err(ScrapeError::MissingUrl);
        }

        task.status = TaskStatus::Running;
        info!("Starting task {} with fetcher {}", task.id, self.fetcher.name());

        if let Some(robots) = &self.robots {
            match robots.policy_for(&task.request.url).await {
                Ok(policy) => task.session.robots = policy,
                Err(e) => warn!("Failed to load robots.txt for {}: {}", task.request.url, e),
            }
        }

        let scraper = task.scraper.clone();
        let mut pacer = Pacer::default();
        let result = self
            .scrape(
                &scraper,
                task.request.clone(),
                &mut task.session,
                &mut pacer,
                &mut task.results,
                0,
            )
            .await;

        match &result {
            Ok(()) => {
                task.status = TaskStatus::Completed;
                info!(
                    "Task {} completed: {} pages, {} records",
                    task.id,
                    task.results.page_count(),
                    task.results.all_blocks().len()
                );
            }
            Err(e) => {
                task.status = TaskStatus::Failed;
                metrics::record_task_failed(e.kind());
                error!(
                    "Task {} failed after {} pages: {}",
                    task.id,
                    task.results.page_count(),
                    e
                );
            }
        }
        result
    }

    fn scrape<'a>(
        &'a self,
        scraper: &'a Scraper,
        request: FetchRequest,
        session: &'a mut Session,
        pacer: &'a mut Pacer,
        results: &'a mut Results,
        depth: usize,
    ) -> BoxFuture<'a, Result<(), ScrapeError>> {
        async move {
            let opts = &scraper.opts;
            let mut fetched: u32 = 0;
            let mut state = PageState::Fetching(request.url.clone());

            loop {
                state = match state {
                    PageState::Fetching(url) => {
                        if url.is_empty() {
                            PageState::Done
                        } else if opts.max_pages > 0 && fetched >= opts.max_pages {
                            debug!("Reached page limit {} at {}", opts.max_pages, url);
                            PageState::Done
                        } else {
                            let crawl_delay = session
                                .robots
                                .as_ref()
                                .and_then(|r| r.crawl_delay(self.fetcher.user_agent()));
                            pacer.wait(opts.delay(crawl_delay)).await;
                            fetched += 1;

                            let page_request = request.with_url(url.as_str());
                            match self.fetch_with_retry(&page_request, session, opts.retry_times).await {
                                Ok(response) => {
                                    session.apply_cookies(response.cookies.clone());
                                    PageState::Extracting { url, response }
                                }
                                Err(source) => PageState::Failed {
                                    error: ScrapeError::Fetch {
                                        url: url.clone(),
                                        source,
                                    },
                                    url,
                                },
                            }
                        }
                    }
                    PageState::Extracting { url, response } => {
                        results.record_visit(url.as_str(), None);
                        match process_page(scraper, &response.url, &response.content) {
                            Ok(page) => PageState::Advancing { url, page },
                            Err(source) => PageState::Failed {
                                error: ScrapeError::Extract {
                                    url: url.clone(),
                                    source,
                                },
                                url,
                            },
                        }
                    }
                    PageState::Advancing { url, mut page } => {
                        if let Err(error) = self
                            .scrape_details(
                                scraper,
                                &page.base_url,
                                &request,
                                &mut page.records,
                                session,
                                pacer,
                                results,
                                depth,
                            )
                            .await
                        {
                            PageState::Failed { url, error }
                        } else {
                            info!(
                                "Page {} ({}) yielded {} records",
                                results.page_count() + 1,
                                url,
                                page.records.len()
                            );
                            metrics::record_blocks_extracted(page.records.len());
                            results.push_page(page.records);

                            match page.next {
                                Ok(Some(next)) => PageState::Fetching(next),
                                Ok(None) => PageState::Done,
                                Err(source) => PageState::Failed {
                                    error: ScrapeError::Paginate {
                                        url: url.clone(),
                                        source,
                                    },
                                    url,
                                },
                            }
                        }
                    }
                    PageState::Done => return Ok(()),
                    PageState::Failed { url, error } => {
                        results.record_visit(url, Some(error.to_string()));
                        return Err(error);
                    }
                };
            }
        }
        .boxed()
    }

    /// 对带详情子计划的字段，抓取记录中的链接并把子结果写入 `<字段>_details`
    #[allow(clippy::too_many_arguments)]
    async fn scrape_details(
        &self,
        scraper: &Scraper,
        page_url: &str,
        request: &FetchRequest,
        records: &mut [Block],
        session: &mut Session,
        pacer: &mut Pacer,
        results: &mut Results,
        depth: usize,
    ) -> Result<(), ScrapeError> {
        for part in &scraper.parts {
            let Some(child) = &part.details else {
                continue;
            };

            for record in records.iter_mut() {
                let links = detail_links(record.get(&part.name));
                if links.is_empty() {
                    continue;
                }

                let mut details = Vec::new();
                for href in links {
                    let url = match resolve_href(page_url, &href) {
                        Ok(url) => url,
                        Err(e) => {
                            warn!("Skipping detail link {} on {}: {}", href, page_url, e);
                            continue;
                        }
                    };

                    let mut child_results = Results::new();
                    let outcome = self
                        .scrape(
                            child,
                            request.with_url(url.as_str()),
                            session,
                            pacer,
                            &mut child_results,
                            depth + 1,
                        )
                        .await;
                    results.merge_visited(std::mem::take(&mut child_results.visited));
                    outcome.map_err(|e| ScrapeError::Details {
                        url: url.clone(),
                        source: Box::new(e),
                    })?;

                    details.extend(child_results.all_blocks().into_iter().map(Value::Object));
                }
                record.insert(format!("{}_details", part.name), Value::Array(details));
            }
        }
        Ok(())
    }

    async fn fetch_with_retry(
        &self,
        request: &FetchRequest,
        session: &Session,
        retry_times: u32,
    ) -> Result<FetchResponse, FetchError> {
        let policy = self.retry_policy.clone().with_max_retries(retry_times);
        let mut attempt = 0;
        loop {
            let result = self
                .fetcher
                .fetch(request, session)
                .await
                .and_then(|response| {
                    if response.is_success() {
                        Ok(response)
                    } else {
                        Err(FetchError::Status(response.status_code))
                    }
                });

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && policy.should_retry(attempt) => {
                    attempt += 1;
                    let backoff = policy.calculate_backoff(attempt);
                    warn!(
                        "Fetching {} failed: {}. Retry {}/{} in {:?}",
                        request.url, e, attempt, retry_times, backoff
                    );
                    metrics::record_fetch_retry();
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// 解析文档、提取记录并计算下一页
///
/// 文档不是 Send，只在这个同步步骤内存在
fn process_page(scraper: &Scraper, url: &str, content: &str) -> Result<ProcessedPage, PartFailure> {
    let doc = Html::parse_document(content);
    let records = ExtractionPipeline::run(scraper, &doc)?;
    let next = scraper.paginator.next_page(url, &doc);
    Ok(ProcessedPage {
        base_url: url.to_string(),
        records,
        next,
    })
}

/// 详情字段的值可以是单个链接或链接数组
fn detail_links(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(href)) if !href.is_empty() => vec![href.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "pagination_engine_test.rs"]
mod tests;
