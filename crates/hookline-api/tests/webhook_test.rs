//! Integration tests for the `/webhook` endpoint.
//!
//! Posts GitHub deliveries through the router and checks the response and
//! what landed in the store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use hookline_api::{create_router, AppState};
use hookline_core::{store::mock::InMemoryEventStore, TestClock};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(store: &InMemoryEventStore) -> Router {
    let clock = TestClock::at(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
    create_router(AppState::new(Arc::new(store.clone()), Arc::new(clock)))
}

fn delivery(event: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(event) = event {
        builder = builder.header("X-GitHub-Event", event);
    }
    builder.body(body.into()).expect("build request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("response should be JSON")
}

fn pr_payload(action: &str, merged: bool) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "action": action,
        "pull_request": {
            "id": 7,
            "user": {"login": "bob"},
            "head": {"ref": "feat"},
            "base": {"ref": "main"},
            "merged": merged
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn push_delivery_is_stored() {
    let store = InMemoryEventStore::new();
    let payload = json!({
        "pusher": {"name": "alice"},
        "ref": "refs/heads/main",
        "after": "abcdef1234"
    });

    let response = app(&store)
        .oneshot(delivery(Some("push"), serde_json::to_vec(&payload).unwrap()))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "success"}));

    let stored = store.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].action_type.as_deref(), Some("push"));
    assert_eq!(stored[0].author.as_deref(), Some("alice"));
    assert_eq!(stored[0].to_branch.as_deref(), Some("main"));
    assert_eq!(stored[0].from_branch, None);
    assert_eq!(stored[0].request_id.as_deref(), Some("abcdef12"));
    assert_eq!(stored[0].timestamp, Some(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()));
}

#[tokio::test]
async fn opened_and_merged_pull_requests_are_stored() {
    let store = InMemoryEventStore::new();

    for (action, merged) in [("opened", false), ("closed", true)] {
        let response = app(&store)
            .oneshot(delivery(Some("pull_request"), pr_payload(action, merged)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let action_types: Vec<_> =
        store.all().await.into_iter().filter_map(|e| e.action_type).collect();
    assert_eq!(action_types, ["pull_request", "merge"]);
}

#[tokio::test]
async fn ignored_deliveries_succeed_without_storing() {
    let store = InMemoryEventStore::new();

    let cases = [
        delivery(Some("pull_request"), pr_payload("closed", false)),
        delivery(Some("pull_request"), pr_payload("synchronize", false)),
        delivery(Some("issues"), r#"{"action": "opened"}"#),
        delivery(Some("ping"), r#"{"zen": "Keep it logically awesome."}"#),
        delivery(None, r#"{"ref": "refs/heads/main"}"#),
    ];

    for request in cases {
        let response = app(&store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "success");
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_push_returns_error() {
    let store = InMemoryEventStore::new();

    let response = app(&store)
        .oneshot(delivery(Some("push"), r#"{"ref": "refs/heads/main"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let message = body["error"].as_str().expect("error should be a string");
    assert!(message.contains("pusher"), "unexpected message: {message}");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn closed_pull_request_without_merged_flag_returns_error() {
    let store = InMemoryEventStore::new();
    let payload = r#"{
        "action": "closed",
        "pull_request": {
            "id": 7,
            "user": {"login": "bob"},
            "head": {"ref": "feat"},
            "base": {"ref": "main"}
        }
    }"#;

    let response = app(&store).oneshot(delivery(Some("pull_request"), payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("pull_request.merged"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn non_json_body_returns_error() {
    let store = InMemoryEventStore::new();

    let response = app(&store).oneshot(delivery(Some("push"), "ref=main")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["error"].is_string());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn store_failure_returns_error() {
    let store = InMemoryEventStore::new();
    store.fail_with(Some("connection refused")).await;

    let payload = r#"{"pusher": {"name": "alice"}, "ref": "refs/heads/main"}"#;
    let response = app(&store).oneshot(delivery(Some("push"), payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn replayed_push_is_stored_twice() {
    let store = InMemoryEventStore::new();
    let payload = r#"{"pusher": {"name": "alice"}, "ref": "refs/heads/main", "after": "abc"}"#;

    for _ in 0..2 {
        let response = app(&store).oneshot(delivery(Some("push"), payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn webhook_rejects_get() {
    let store = InMemoryEventStore::new();
    let request = Request::builder().method("GET").uri("/webhook").body(Body::empty()).unwrap();

    let response = app(&store).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let store = InMemoryEventStore::new();

    let response = app(&store).oneshot(delivery(Some("ping"), "{}")).await.unwrap();

    let request_id = response.headers().get("x-request-id").expect("request id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
