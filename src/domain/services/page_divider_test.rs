// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;

fn selectors(css: &[&str]) -> Vec<Selector> {
    css.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

fn ids(blocks: &[ElementRef<'_>]) -> Vec<String> {
    blocks
        .iter()
        .map(|b| b.value().attr("id").unwrap_or_default().to_string())
        .collect()
}

const LISTING: &str = r#"
    <html><body>
        <h1 class="heading">Results</h1>
        <div class="list">
            <div class="item" id="i1"><span class="title">A</span><span class="price">1</span></div>
            <div class="item" id="i2"><span class="title">B</span><span class="price">2</span></div>
            <div class="item" id="i3"><span class="title">C</span><span class="price">3</span></div>
        </div>
    </body></html>
"#;

#[test]
fn test_whole_body_is_single_block() {
    let doc = Html::parse_document(LISTING);
    let blocks = PageDivider::from_selectors(Vec::new()).divide(&doc);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].value().name(), "body");
}

#[test]
fn test_whole_body_on_fragment_without_body_tag() {
    let doc = Html::parse_document("<p>bare</p>");
    let blocks = PageDivider::WholeBody.divide(&doc);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].value().name(), "body");
}

#[test]
fn test_single_selector_yields_repeating_units() {
    let doc = Html::parse_document(LISTING);
    let blocks = PageDivider::from_selectors(selectors(&[".title"])).divide(&doc);

    assert_eq!(ids(&blocks), vec!["i1", "i2", "i3"]);
}

#[test]
fn test_multiple_selectors_share_unit() {
    let doc = Html::parse_document(LISTING);
    let blocks = PageDivider::from_selectors(selectors(&[".title", ".price"])).divide(&doc);

    assert_eq!(ids(&blocks), vec!["i1", "i2", "i3"]);
}

#[test]
fn test_page_level_selector_degenerates_to_common_container() {
    let doc = Html::parse_document(LISTING);
    let blocks = PageDivider::from_selectors(selectors(&[".heading", ".title"])).divide(&doc);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].value().name(), "body");
}

#[test]
fn test_missing_selector_yields_no_blocks() {
    let doc = Html::parse_document(LISTING);
    let blocks = PageDivider::from_selectors(selectors(&[".title", ".rating"])).divide(&doc);
    assert!(blocks.is_empty());
}

#[test]
fn test_blocks_follow_document_order_across_containers() {
    let doc = Html::parse_document(
        r#"<body>
            <section>
                <article id="a1"><h2>one</h2><p>x</p></article>
                <article id="a2"><h2>two</h2><p>y</p></article>
            </section>
            <section>
                <article id="a3"><h2>three</h2><p>z</p></article>
            </section>
        </body>"#,
    );
    let blocks = PageDivider::from_selectors(selectors(&["h2", "p"])).divide(&doc);

    assert_eq!(ids(&blocks), vec!["a1", "a2", "a3"]);
}

#[test]
fn test_unit_missing_a_field_is_not_a_block() {
    // 第二个单元缺少 .price，不构成区块
    let doc = Html::parse_document(
        r#"<body><ul>
            <li id="l1"><b class="title">A</b><i class="price">1</i></li>
            <li id="l2"><b class="title">B</b></li>
            <li id="l3"><b class="title">C</b><i class="price">3</i></li>
        </ul></body>"#,
    );
    let blocks = PageDivider::from_selectors(selectors(&[".title", ".price"])).divide(&doc);

    assert_eq!(ids(&blocks), vec!["l1", "l3"]);
}
