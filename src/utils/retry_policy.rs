// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 抓取重试策略
///
/// 只作用于网络阶段（页面抓取与 robots.txt 拉取）；页面划分与字段提取失败不会重试。
/// `jitter_factor` 为 0 时退避时间是确定的
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次尝试之后允许的额外尝试次数
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// 抖动幅度，按退避时间的比例计算 (0.0-1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// 以给定的初始退避时间创建，其余参数取默认值
    pub fn with_initial_backoff(initial_backoff: Duration) -> Self {
        Self {
            initial_backoff,
            ..Default::default()
        }
    }

    /// 覆盖额外尝试次数（任务的 retry_times）
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 已重试 `attempt` 次后是否还能再试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// 第 `attempt` 次重试前的等待时间（从 1 开始），不超过 `max_backoff`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        if self.initial_backoff.is_zero() {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_secs = self.max_backoff.as_secs_f64();
        let secs = (self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent))
            .min(max_secs);

        let secs = if self.jitter_factor > 0.0 && secs > 0.0 {
            let spread = secs * self.jitter_factor.min(1.0);
            (secs + rand::random_range(-spread..spread)).clamp(0.0, max_secs)
        } else {
            secs
        };

        // 乘数为 NaN 或无穷时退回上限
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_backoff)
    }
}
