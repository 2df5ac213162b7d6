// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 指标（metrics）：抓取过程的计数器与 Prometheus 导出
pub mod metrics;
