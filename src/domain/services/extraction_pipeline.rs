// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::domain::extract::Extract;
use crate::domain::models::results::Block;
use crate::domain::models::scraper::{Part, Scraper};
use crate::utils::errors::PartFailure;

/// 提取流水线
///
/// 对每个区块依次执行所有字段：提取失败立即中止，缺失的值不写入记录，
/// 没有任何字段的记录被丢弃
pub struct ExtractionPipeline;

impl ExtractionPipeline {
    /// 划分页面并提取所有记录
    pub fn run(scraper: &Scraper, doc: &Html) -> Result<Vec<Block>, PartFailure> {
        let blocks = scraper.divider.divide(doc);
        let records = Self::extract_blocks(&scraper.parts, &blocks)?;
        debug!(
            "Extracted {} records from {} blocks",
            records.len(),
            blocks.len()
        );
        Ok(records)
    }

    /// 按区块顺序提取记录
    pub fn extract_blocks(
        parts: &[Part],
        blocks: &[ElementRef<'_>],
    ) -> Result<Vec<Block>, PartFailure> {
        let mut records = Vec::with_capacity(blocks.len());
        for block in blocks {
            if let Some(record) = Self::extract_block(parts, *block)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// 提取单个区块，记录为空时返回 None
    pub fn extract_block(parts: &[Part], block: ElementRef<'_>) -> Result<Option<Block>, PartFailure> {
        let mut record = Block::new();
        for part in parts {
            let selection = part.select(block);
            let value = part
                .extractor
                .extract(&selection)
                .map_err(|source| PartFailure {
                    part: part.name.clone(),
                    source,
                })?;
            if let Some(value) = value {
                record.insert(part.name.clone(), value);
            }
        }

        if record.is_empty() {
            return Ok(None);
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
#[path = "extraction_pipeline_test.rs"]
mod tests;
