// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use blockscrape::domain::models::{Payload, Task};
use blockscrape::domain::services::PaginationEngine;
use blockscrape::engines::reqwest_engine::ReqwestEngine;
use blockscrape::utils::retry_policy::RetryPolicy;
use blockscrape::utils::telemetry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 使用真实 HTTP 引擎、不等待重试退避的翻页引擎
pub fn create_test_engine() -> PaginationEngine {
    telemetry::try_init_telemetry();
    let fetcher = ReqwestEngine::new("blockscrape-test/1.0", Duration::from_secs(5))
        .expect("failed to build http client");
    PaginationEngine::new(Arc::new(fetcher)).with_retry_policy(RetryPolicy::with_initial_backoff(Duration::ZERO))
}

/// 把 HTML 片段包装成完整文档
pub fn html_page(body: &str) -> String {
    format!("<html><head><title>test</title></head><body>{}</body></html>", body)
}

pub async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(html_page(body)),
        )
        .mount(server)
        .await;
}

/// 以 JSON 负载创建任务，`{base}` 会被替换为模拟服务器地址
pub fn create_task(server: &MockServer, payload: Value) -> Task {
    let raw = payload.to_string().replace("{base}", &server.uri());
    let payload = Payload::from_json(&raw).expect("invalid payload");
    Task::new(&payload).expect("payload should compile")
}
