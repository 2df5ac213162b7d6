// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 字段编译器（field_compiler）：把字段描述编译为抓取计划
/// - 页面划分器（page_divider）：把文档划分为重复的区块
/// - 提取流水线（extraction_pipeline）：对每个区块执行字段提取
/// - 翻页器（paginator）：计算下一页地址
/// - 翻页引擎（pagination_engine）：驱动多页抓取循环
pub mod extraction_pipeline;
pub mod field_compiler;
pub mod page_divider;
pub mod pagination_engine;
pub mod paginator;

pub use extraction_pipeline::ExtractionPipeline;
pub use field_compiler::{FieldCompiler, MAX_DETAILS_DEPTH};
pub use page_divider::PageDivider;
pub use pagination_engine::PaginationEngine;
pub use paginator::{NoopPaginator, Paginator, SelectorPaginator};
