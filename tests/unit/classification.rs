// tests/unit/classification.rs
//! Pre-flight guards, body decoding and error classification.

use crate::common::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use notion_sdk::{CancellationToken, ClientError, Disposition, ErrorKind, NotionErrorCode};
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderValue, CONTENT_ENCODING};
use reqwest::StatusCode;
use serde::Serialize;
use std::io::Write;

#[tokio::test]
async fn oversized_body_is_rejected_with_zero_sends() {
    let (executor, transport) = scripted_executor(test_config(3), vec![Step::Reply(ok_reply())]);
    let body = serde_json::json!({ "blob": "x".repeat(600 * 1024) });

    let err = executor
        .post("/pages", &body, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ClientError::SizeLimitExceeded { size, limit } => {
            assert!(size > limit);
            assert_eq!(limit, 512 * 1024);
        }
        other => panic!("expected SizeLimitExceeded, got {:?}", other),
    }
    assert_eq!(transport.sends(), 0);
}

struct Unencodable;

impl Serialize for Unencodable {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("refuses to serialize"))
    }
}

#[tokio::test]
async fn unencodable_body_fails_without_sending() {
    let (executor, transport) = scripted_executor(test_config(3), vec![Step::Reply(ok_reply())]);

    let err = executor
        .post("/pages", &Unencodable, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(err.status(), None);
    assert_eq!(err.disposition(), Disposition::FixInput);
    assert_eq!(transport.sends(), 0);
}

#[tokio::test]
async fn undecodable_error_body_keeps_the_status() {
    let (executor, transport) = scripted_executor(
        test_config(1),
        vec![Step::Reply(json_reply(502, "<html>Bad Gateway</html>"))],
    );

    let err = executor
        .get("/pages/x", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(transport.sends(), 1);
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn error_body_without_message_is_a_serialization_error() {
    let (executor, _) = scripted_executor(
        test_config(1),
        vec![Step::Reply(json_reply(404, r#"{"code":"object_not_found"}"#))],
    );

    let err = executor
        .get("/pages/x", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn unknown_error_codes_are_preserved() {
    let (executor, _) = scripted_executor(
        test_config(1),
        vec![Step::Reply(json_reply(
            400,
            r#"{"code":"brand_new_code","message":"something new"}"#,
        ))],
    );

    let err = executor
        .get("/pages/x", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Api { code, .. } => {
            assert_eq!(code, NotionErrorCode::Unknown("brand_new_code".to_string()))
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn gzip_bodies_are_inflated() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(br#"{"object":"list","results":[],"has_more":false}"#).unwrap();
    let mut reply = json_reply(200, "");
    reply.body = encoder.finish().unwrap();
    reply
        .headers
        .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));

    let (executor, _) = scripted_executor(test_config(1), vec![Step::Reply(reply)]);
    let response = executor
        .get("/users", &CancellationToken::new())
        .await
        .unwrap();

    let value: serde_json::Value = response.json().unwrap();
    assert_eq!(value["object"], "list");
}

#[tokio::test]
async fn corrupt_compressed_body_is_a_serialization_error() {
    let mut reply = json_reply(200, "definitely not gzip");
    reply
        .headers
        .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));

    let (executor, _) = scripted_executor(test_config(3), vec![Step::Reply(reply)]);
    let err = executor
        .get("/users", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(err.status(), Some(StatusCode::OK));
}

#[tokio::test]
async fn redirects_count_as_success() {
    let (executor, _) = scripted_executor(test_config(3), vec![Step::Reply(json_reply(304, ""))]);
    let response = executor
        .get("/users", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NOT_MODIFIED);
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn required_headers_are_sent() {
    let (executor, transport) = scripted_executor(test_config(1), vec![Step::Reply(ok_reply())]);

    executor
        .patch(
            "/blocks/abc/children",
            &serde_json::json!({"children": []}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://api.notion.com/v1/blocks/abc/children");
    assert_eq!(
        request.headers["authorization"],
        format!("Bearer {}", TEST_API_KEY).as_str()
    );
    assert_eq!(request.headers["notion-version"], "2022-06-28");
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["content-length"], "15");
}
