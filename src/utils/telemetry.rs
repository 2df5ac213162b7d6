// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,blockscrape=debug";

/// 日志格式环境变量，取值 `json` 时输出结构化 JSON 日志
pub const LOG_FORMAT_ENV: &str = "BLOCKSCRAPE_LOG_FORMAT";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

/// 初始化日志，RUST_LOG 未设置时使用默认过滤规则
pub fn init_telemetry() {
    let json = json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    tracing_subscriber::registry()
        .with(env_filter())
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// 与 `init_telemetry` 相同，但允许重复调用（测试中每个用例都可能调用）
pub fn try_init_telemetry() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_test_writer())
        .try_init()
        .is_ok()
}
