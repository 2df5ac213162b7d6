// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 提取器模块
///
/// 提取器注册表：常量、计数、文本、HTML、外部 HTML、属性、正则，
/// 以及由两个简单提取器组成的链接和图片提取器
pub mod composite;
pub mod extractor;
pub mod params;
pub mod selection;

pub use composite::{ImageExtractor, LinkExtractor};
pub use extractor::{Extract, Extractor, ExtractorKind};
pub use selection::Selection;
