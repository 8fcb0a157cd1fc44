// tests/unit/cancellation.rs
//! Cancellation is honored before, during and between attempts.

use crate::common::*;
use notion_sdk::{CancellationToken, ClientError};
use std::time::{Duration, Instant};

fn cancel_after(token: &CancellationToken, delay: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
}

#[tokio::test]
async fn already_canceled_call_sends_nothing() {
    let (executor, transport) = scripted_executor(test_config(3), vec![Step::Reply(ok_reply())]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = executor.get("/users/me", &cancel).await.unwrap_err();

    assert!(matches!(err, ClientError::Canceled { attempts: 0 }));
    assert_eq!(transport.sends(), 0);
}

#[tokio::test]
async fn cancel_during_slow_response_wins_over_success() {
    let (executor, transport) = scripted_executor(
        test_config(3),
        vec![Step::Slow(Duration::from_secs(1), ok_reply())],
    );
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(50));

    let started = Instant::now();
    let err = executor.get("/users/me", &cancel).await.unwrap_err();

    assert!(err.is_canceled(), "expected Canceled, got {:?}", err);
    assert_eq!(err.attempts(), Some(1));
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn cancel_during_backoff_returns_promptly() {
    // The first retry would wait ten seconds.
    let config = test_config(3)
        .with_retry_wait(Duration::from_secs(10), Duration::from_secs(20))
        .unwrap();
    let (executor, transport) = scripted_executor(
        config,
        vec![Step::Reply(json_reply(
            503,
            r#"{"code":"service_unavailable","message":"busy"}"#,
        ))],
    );
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(50));

    let started = Instant::now();
    let err = executor.get("/pages/x", &cancel).await.unwrap_err();

    assert!(matches!(err, ClientError::Canceled { attempts: 1 }));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn cancel_during_rate_limit_wait_returns_promptly() {
    let mut limited = json_reply(429, r#"{"code":"rate_limited","message":"slow down"}"#);
    limited
        .headers
        .insert("retry-after", reqwest::header::HeaderValue::from_static("60"));
    let (executor, transport) = scripted_executor(test_config(3), vec![Step::Reply(limited)]);
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(50));

    let started = Instant::now();
    let err = executor.get("/search", &cancel).await.unwrap_err();

    assert!(err.is_canceled());
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(transport.sends(), 1);
}
