// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含负载模型、字段编译、页面划分、区块提取和翻页引擎
pub mod domain;

/// 引擎模块
///
/// 实现 HTTP 与无头浏览器抓取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供指标记录与导出
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
