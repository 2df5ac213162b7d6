// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心抓取逻辑，包括：
/// - 领域模型（models）：负载、抓取计划、任务、会话与结果
/// - 提取器（extract）：从区块节点集合中取值的策略
/// - 服务（services）：字段编译、页面划分、区块提取与翻页引擎
///
/// 领域层只通过 `engines::traits::Fetcher` 与网络交互。
pub mod extract;
pub mod models;
pub mod services;
