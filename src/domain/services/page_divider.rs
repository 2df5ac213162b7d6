// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// 页面划分器
///
/// 将整页文档划分为重复出现的结构单元（区块），每个区块产出一条记录
#[derive(Debug, Clone)]
pub enum PageDivider {
    /// 整个 `<body>` 作为唯一区块
    WholeBody,
    /// 包含所有选择器匹配的最小重复单元
    ByIntersection(Vec<Selector>),
}

impl PageDivider {
    /// 根据字段选择器构建划分器，没有选择器时退化为整页
    pub fn from_selectors(selectors: Vec<Selector>) -> Self {
        if selectors.is_empty() {
            PageDivider::WholeBody
        } else {
            PageDivider::ByIntersection(selectors)
        }
    }

    /// 按文档顺序返回区块
    pub fn divide<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            PageDivider::WholeBody => vec![body(doc)],
            PageDivider::ByIntersection(selectors) => intersect(doc, selectors),
        }
    }
}

fn body(doc: &Html) -> ElementRef<'_> {
    let root = doc.root_element();
    root.children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or(root)
}

fn intersect<'a>(doc: &'a Html, selectors: &[Selector]) -> Vec<ElementRef<'a>> {
    if selectors.is_empty() {
        return Vec::new();
    }

    let matches: Vec<Vec<ElementRef<'a>>> = selectors
        .iter()
        .map(|selector| doc.select(selector).collect())
        .collect();
    if matches.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    // 每个选择器的匹配节点的所有真祖先
    let ancestor_sets: Vec<HashSet<_>> = matches
        .iter()
        .map(|nodes| {
            nodes
                .iter()
                .flat_map(|node| node.ancestors().map(|a| a.id()))
                .collect()
        })
        .collect();

    // 每个匹配节点向上找到第一个同时包含所有选择器匹配的祖先
    let candidates: HashSet<_> = matches
        .iter()
        .flatten()
        .filter_map(|node| {
            node.ancestors()
                .find(|a| ancestor_sets.iter().all(|set| set.contains(&a.id())))
                .map(|a| a.id())
        })
        .collect();

    // 包含其他候选的候选不是最小单元
    let containers: HashSet<_> = candidates
        .iter()
        .filter_map(|id| doc.tree.get(*id))
        .flat_map(|node| node.ancestors().map(|a| a.id()))
        .filter(|id| candidates.contains(id))
        .collect();

    doc.root_element()
        .descendants()
        .filter(|node| candidates.contains(&node.id()) && !containers.contains(&node.id()))
        .filter_map(ElementRef::wrap)
        .collect()
}

#[cfg(test)]
#[path = "page_divider_test.rs"]
mod tests;
