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

use anyhow::Context;
use blockscrape::config::settings::Settings;
use blockscrape::domain::models::{OutputFormat, Payload, ScrapeOptions, Task};
use blockscrape::domain::services::{FieldCompiler, PaginationEngine};
use blockscrape::infrastructure::metrics;
use blockscrape::utils::telemetry;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// 主函数
///
/// 读取负载文件，执行一次抓取任务并把结果以 JSON 输出到标准输出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();

    let payload_path = env::args()
        .nth(1)
        .context("usage: blockscrape <payload.json|payload.yaml>")?;

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if let Some(addr) = &settings.metrics.listen_addr {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid metrics listen address: {}", addr))?;
        metrics::init_metrics(addr);
    }

    // 3. Compile the payload
    let payload = Payload::from_path(&payload_path)?;
    let compiler = FieldCompiler::with_defaults(ScrapeOptions::from(&settings.scrape));
    let scraper = Arc::new(compiler.compile(&payload)?);
    if scraper.opts.format != OutputFormat::Json {
        warn!(
            "Output format {} is not encoded by this binary, writing JSON",
            scraper.opts.format
        );
    }
    let mut task = Task::with_scraper(scraper, payload.request.clone());
    info!("Task {} created for {}", task.id, task.request.url);

    // 4. Run
    let engine = PaginationEngine::from_settings(&settings)?;
    let outcome = engine.run(&mut task).await;

    println!("{}", serde_json::to_string_pretty(&task.output())?);
    outcome?;
    Ok(())
}
