// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 一条记录：字段名 → 提取值
pub type Block = Map<String, Value>;

/// 抓取结果
///
/// 按页分组的记录列表，以及已访问 URL 到错误信息的映射
#[derive(Debug, Clone, Default, Serialize)]
pub struct Results {
    /// 已访问的 URL，值为 None 表示成功
    pub visited: HashMap<String, Option<String>>,
    /// 每个已处理页面对应一个（可能为空的）记录列表
    pub results: Vec<Vec<Block>>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第一页的第一条记录
    pub fn first(&self) -> Option<&Block> {
        self.results.first().and_then(|page| page.first())
    }

    /// 所有页面的记录，按顺序展开
    pub fn all_blocks(&self) -> Vec<Block> {
        self.results.iter().flatten().cloned().collect()
    }

    /// 已处理的页数
    pub fn page_count(&self) -> usize {
        self.results.len()
    }

    pub fn record_visit(&mut self, url: impl Into<String>, error: Option<String>) {
        self.visited.insert(url.into(), error);
    }

    pub fn push_page(&mut self, page: Vec<Block>) {
        self.results.push(page);
    }

    /// 合并子抓取的访问记录
    pub fn merge_visited(&mut self, other: HashMap<String, Option<String>>) {
        self.visited.extend(other);
    }

    /// 按输出选项整理结果：按页分组或展开为单一列表
    pub fn output(&self, paginate: bool) -> Value {
        if paginate {
            Value::Array(
                self.results
                    .iter()
                    .map(|page| Value::Array(page.iter().cloned().map(Value::Object).collect()))
                    .collect(),
            )
        } else {
            Value::Array(self.all_blocks().into_iter().map(Value::Object).collect())
        }
    }
}
