// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::extract::extractor::{AttrExtractor, TextExtractor};
use crate::domain::extract::Extractor;
use crate::domain::models::payload::{FieldSpec, Payload};
use crate::utils::errors::ExtractError;
use scraper::Selector;
use serde_json::json;

const ITEMS: &str = r#"
    <html><body>
        <div class="item"><a class="title" href="/a">A</a></div>
        <div class="item"><a class="title" href="/b">B</a></div>
        <div class="item"><a class="title" href="/c">C</a></div>
    </body></html>
"#;

fn build(fields: Vec<FieldSpec>) -> Scraper {
    Scraper::new(&Payload {
        fields,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_text_scenario() {
    let doc = Html::parse_document(ITEMS);
    let records = ExtractionPipeline::run(&build(vec![FieldSpec::new("title", ".title", "text")]), &doc)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        json!([{ "title": "A" }, { "title": "B" }, { "title": "C" }])
    );
}

#[test]
fn test_link_scenario() {
    let doc = Html::parse_document(ITEMS);
    let records = ExtractionPipeline::run(&build(vec![FieldSpec::new("title", ".title", "link")]), &doc)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        json!([
            { "title_text": "A", "title_link": "/a" },
            { "title_text": "B", "title_link": "/b" },
            { "title_text": "C", "title_link": "/c" }
        ])
    );
}

#[test]
fn test_self_selector_matches_block_itself() {
    let doc = Html::parse_document(r#"<body><p class="note" data-k="v">hello</p></body>"#);
    let blocks: Vec<_> = doc
        .select(&Selector::parse(".note").unwrap())
        .collect();

    let self_part = Part::new("k", ".", Extractor::Attr(AttrExtractor::new("data-k"))).unwrap();
    let record = ExtractionPipeline::extract_block(&[self_part], blocks[0])
        .unwrap()
        .unwrap();
    assert_eq!(record["k"], json!("v"));

    // 子选择不会匹配区块本身
    let nested = Part::new("k", ".note", Extractor::Attr(AttrExtractor::new("data-k"))).unwrap();
    assert!(ExtractionPipeline::extract_block(&[nested], blocks[0])
        .unwrap()
        .is_none());
}

#[test]
fn test_absent_values_are_omitted_and_empty_records_dropped() {
    let doc = Html::parse_document(
        r#"<body>
            <div class="row"><h3>One</h3><span class="tag">x</span></div>
            <div class="row"><h3>Two</h3></div>
        </body>"#,
    );
    let parts = vec![
        Part::new("tag", ".tag", Extractor::Text(TextExtractor::default())).unwrap(),
        Part::new("missing", ".nothing", Extractor::Text(TextExtractor::default())).unwrap(),
    ];
    let rows: Vec<_> = doc.select(&Selector::parse(".row").unwrap()).collect();

    let records = ExtractionPipeline::extract_blocks(&parts, &rows).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(serde_json::to_value(&records[0]).unwrap(), json!({ "tag": "x" }));
    assert!(records.len() <= rows.len());
}

#[test]
fn test_extractor_failure_aborts_with_part_name() {
    let doc = Html::parse_document(ITEMS);
    let s = build(vec![
        FieldSpec::new("title", ".title", "text"),
        FieldSpec::new("broken", ".title", "attr"),
    ]);

    let err = ExtractionPipeline::run(&s, &doc).unwrap_err();
    assert_eq!(err.part, "broken");
    assert_eq!(err.source, ExtractError::MissingAttribute);
}

#[test]
fn test_whole_body_with_no_selectors() {
    let doc = Html::parse_document(ITEMS);
    let s = build(vec![
        FieldSpec::new("source", ".", "const").with_params(json!({ "value": "listing" })),
        FieldSpec::new("items", ".", "count"),
    ]);

    let records = ExtractionPipeline::run(&s, &doc).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["source"], json!("listing"));
    assert_eq!(records[0]["items"], json!(1));
}
