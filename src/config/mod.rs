// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理抓取引擎、任务默认选项和指标导出的配置
pub mod settings;
