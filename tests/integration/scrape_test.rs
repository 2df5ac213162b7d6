// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_task, create_test_engine, html_page, mount_page};
use blockscrape::domain::models::TaskStatus;
use blockscrape::utils::errors::ScrapeError;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_scrape_text_fields_single_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/products",
        r#"
        <div class="item"><h2 class="title">Alpha</h2><span class="price">10</span></div>
        <div class="item"><h2 class="title">Beta</h2><span class="price">20</span></div>
        <div class="item"><h2 class="title">Gamma</h2><span class="price">30</span></div>
        "#,
    )
    .await;

    let mut task = create_task(
        &server,
        json!({
            "name": "products",
            "request": { "url": "{base}/products" },
            "fields": [
                { "name": "title", "selector": ".item .title", "extractor": { "type": "text" } },
                { "name": "price", "selector": ".item .price", "extractor": { "type": "text" } }
            ]
        }),
    );

    create_test_engine().run(&mut task).await.unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.results.page_count(), 1);
    assert_eq!(
        task.output(),
        json!([[
            { "title": "Alpha", "price": "10" },
            { "title": "Beta", "price": "20" },
            { "title": "Gamma", "price": "30" }
        ]])
    );
    let visited = format!("{}/products", server.uri());
    assert_eq!(task.results.visited.get(&visited), Some(&None));
}

#[tokio::test]
async fn test_scrape_link_field_expands_to_text_and_link() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/links",
        r#"
        <ul>
          <li class="entry"><a href="/a">First</a></li>
          <li class="entry"><a href="/b">Second</a></li>
        </ul>
        "#,
    )
    .await;

    let mut task = create_task(
        &server,
        json!({
            "request": { "url": "{base}/links" },
            "paginateResults": false,
            "fields": [
                { "name": "entry", "selector": ".entry a", "extractor": { "type": "link" } }
            ]
        }),
    );

    create_test_engine().run(&mut task).await.unwrap();

    assert_eq!(
        task.output(),
        json!([
            { "entry_text": "First", "entry_link": "/a" },
            { "entry_text": "Second", "entry_link": "/b" }
        ])
    );
}

#[tokio::test]
async fn test_scrape_follows_paginator_until_last_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/page/1",
        r#"<p class="row">one</p><a class="next" href="/page/2">next</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/page/2",
        r#"<p class="row">two</p><a class="next" href="/page/3">next</a>"#,
    )
    .await;
    mount_page(&server, "/page/3", r#"<p class="row">three</p>"#).await;

    let mut task = create_task(
        &server,
        json!({
            "request": { "url": "{base}/page/1" },
            "paginator": { "selector": "a.next" },
            "fields": [
                { "name": "row", "selector": ".row", "extractor": { "type": "text" } }
            ]
        }),
    );

    create_test_engine().run(&mut task).await.unwrap();

    assert_eq!(task.results.page_count(), 3);
    let rows: Vec<_> = task
        .results
        .all_blocks()
        .into_iter()
        .map(|b| b["row"].clone())
        .collect();
    assert_eq!(rows, vec![json!("one"), json!("two"), json!("three")]);
    assert_eq!(task.results.visited.len(), 3);
}

#[tokio::test]
async fn test_scrape_self_referencing_paginator_stops_at_max_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            r#"<p class="row">again</p><a class="next" href="/loop">next</a>"#,
        )))
        .expect(2)
        .mount(&server)
        .await;

    let mut task = create_task(
        &server,
        json!({
            "request": { "url": "{base}/loop" },
            "paginator": { "selector": "a.next", "attribute": "href", "maxPages": 2 },
            "fields": [
                { "name": "row", "selector": ".row", "extractor": { "type": "text" } }
            ]
        }),
    );

    create_test_engine().run(&mut task).await.unwrap();

    assert_eq!(task.results.page_count(), 2);
    assert_eq!(task.results.all_blocks().len(), 2);
}

#[tokio::test]
async fn test_scrape_carries_cookies_between_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=xyz; Path=/")
                .set_body_string(html_page(
                    r#"<p class="row">start</p><a class="next" href="/members">next</a>"#,
                )),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/members"))
        .and(header("cookie", "sid=xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(html_page(r#"<p class="row">secret</p>"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut task = create_task(
        &server,
        json!({
            "request": { "url": "{base}/start" },
            "paginator": { "selector": "a.next" },
            "fields": [
                { "name": "row", "selector": ".row", "extractor": { "type": "text" } }
            ]
        }),
    );

    create_test_engine().run(&mut task).await.unwrap();

    assert_eq!(task.session.cookies, "sid=xyz");
    assert_eq!(task.results.page_count(), 2);
}

#[tokio::test]
async fn test_scrape_failure_keeps_partial_results() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/ok",
        r#"<p class="row">kept</p><a class="next" href="/missing">next</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut task = create_task(
        &server,
        json!({
            "request": { "url": "{base}/ok" },
            "paginator": { "selector": "a.next" },
            "retryTimes": 3,
            "fields": [
                { "name": "row", "selector": ".row", "extractor": { "type": "text" } }
            ]
        }),
    );

    let err = create_test_engine().run(&mut task).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Fetch { .. }));
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.results.page_count(), 1);
    assert_eq!(task.results.all_blocks()[0]["row"], json!("kept"));

    let missing = format!("{}/missing", server.uri());
    assert!(matches!(task.results.visited.get(&missing), Some(Some(_))));

    // 404 不可重试
    let requests = server.received_requests().await.unwrap_or_default();
    let missing_hits = requests.iter().filter(|r| r.url.path() == "/missing").count();
    assert_eq!(missing_hits, 1);
}

#[tokio::test]
async fn test_scrape_details_follow_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/list",
        r#"<div class="card"><a href="/detail/1">One</a></div>"#,
    )
    .await;
    mount_page(
        &server,
        "/detail/1",
        r#"<h1 class="name">Item One</h1><p class="desc">Long text</p>"#,
    )
    .await;

    let mut task = create_task(
        &server,
        json!({
            "request": { "url": "{base}/list" },
            "paginateResults": false,
            "fields": [
                {
                    "name": "card",
                    "selector": ".card a",
                    "extractor": { "type": "link" },
                    "details": {
                        "fields": [
                            { "name": "name", "selector": ".name", "extractor": { "type": "text" } },
                            { "name": "desc", "selector": ".desc", "extractor": { "type": "text" } }
                        ]
                    }
                }
            ]
        }),
    );

    create_test_engine().run(&mut task).await.unwrap();

    let blocks = task.results.all_blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["card_link"], json!("/detail/1"));
    assert_eq!(
        blocks[0]["card_link_details"],
        json!([{ "name": "Item One", "desc": "Long text" }])
    );
    assert!(task
        .results
        .visited
        .contains_key(&format!("{}/detail/1", server.uri())));
}
