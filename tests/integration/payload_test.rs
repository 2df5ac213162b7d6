// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_engine, mount_page};
use blockscrape::domain::models::{Payload, Task, TaskStatus};
use blockscrape::utils::errors::ConfigError;
use std::io::Write;
use wiremock::MockServer;

#[tokio::test]
async fn test_yaml_payload_file_runs_end_to_end() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/gallery",
        r#"
        <figure class="photo"><img src="/1.png" alt="first"><figcaption>One</figcaption></figure>
        <figure class="photo"><img src="/2.png" alt="second"><figcaption>Two</figcaption></figure>
        "#,
    )
    .await;

    let yaml = format!(
        r#"
name: gallery
request:
  url: {}/gallery
  type: base
paginateResults: false
fields:
  - name: image
    selector: .photo img
    extractor:
      type: image
  - name: caption
    selector: .photo figcaption
    extractor:
      type: text
"#,
        server.uri()
    );
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let payload = Payload::from_path(file.path()).unwrap();
    let mut task = Task::new(&payload).unwrap();
    create_test_engine().run(&mut task).await.unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    let blocks = task.results.all_blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["image_src"], "/1.png");
    assert_eq!(blocks[0]["image_alt"], "first");
    assert_eq!(blocks[1]["caption"], "Two");
}

#[test]
fn test_invalid_payload_is_rejected_before_fetching() {
    let payload = Payload::from_json(
        r#"{
            "request": { "url": "http://example.com" },
            "fields": [
                { "name": "a", "selector": "p", "extractor": { "type": "text" } },
                { "name": "a", "selector": "span", "extractor": { "type": "text" } }
            ]
        }"#,
    )
    .unwrap();

    assert!(matches!(Task::new(&payload), Err(ConfigError::DuplicateName(name)) if name == "a"));
}

#[test]
fn test_unknown_extractor_is_a_config_error() {
    let payload = Payload::from_json(
        r#"{
            "request": { "url": "http://example.com" },
            "fields": [
                { "name": "a", "selector": "p", "extractor": { "type": "telepathy" } }
            ]
        }"#,
    )
    .unwrap();

    assert!(matches!(Task::new(&payload), Err(ConfigError::UnknownExtractor(_))));
}
