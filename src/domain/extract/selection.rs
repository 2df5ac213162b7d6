// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Selector};

/// 区块内的节点集合
///
/// 提取器的输入，节点按文档顺序排列
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    nodes: Vec<ElementRef<'a>>,
}

impl<'a> Selection<'a> {
    pub fn new(nodes: Vec<ElementRef<'a>>) -> Self {
        Self { nodes }
    }

    /// 只包含区块本身的集合（对应选择器 "."）
    pub fn of(block: ElementRef<'a>) -> Self {
        Self { nodes: vec![block] }
    }

    /// 在区块内部（不含区块本身）查找匹配的节点
    pub fn within(block: ElementRef<'a>, selector: &Selector) -> Self {
        Self {
            nodes: block.select(selector).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<ElementRef<'a>> {
        self.nodes.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementRef<'a>> + '_ {
        self.nodes.iter().copied()
    }

    /// 所有节点文本，以空格连接
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node_text(*node))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 单个节点的文本，空白折叠为单个空格
pub fn node_text(node: ElementRef<'_>) -> String {
    node.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
