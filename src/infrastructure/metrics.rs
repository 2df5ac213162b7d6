// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

pub const PAGES_FETCHED: &str = "blockscrape_pages_fetched_total";
pub const BLOCKS_EXTRACTED: &str = "blockscrape_blocks_extracted_total";
pub const FETCH_RETRIES: &str = "blockscrape_fetch_retries_total";
pub const TASKS_FAILED: &str = "blockscrape_tasks_failed_total";

/// 安装 Prometheus 导出器
///
/// 库本身只记录指标，是否导出由调用方决定
pub fn init_metrics(addr: SocketAddr) {
    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}

pub fn record_page_fetched(engine: &'static str) {
    counter!(PAGES_FETCHED, "engine" => engine).increment(1);
}

pub fn record_blocks_extracted(count: usize) {
    counter!(BLOCKS_EXTRACTED).increment(count as u64);
}

pub fn record_fetch_retry() {
    counter!(FETCH_RETRIES).increment(1);
}

pub fn record_task_failed(reason: &'static str) {
    counter!(TASKS_FAILED, "reason" => reason).increment(1);
}
