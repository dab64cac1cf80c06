//! Integration tests for webhook normalization.
//!
//! Drives realistic GitHub payloads through `RawEventEnvelope::parse` and
//! `normalize`, checking which deliveries become records and what those
//! records contain.

use chrono::{DateTime, TimeZone, Utc};
use hookline_core::{
    normalize, ActionType, EventKind, HooklineError, IgnoreReason, Normalized, RawEventEnvelope,
};
use serde_json::json;

fn received_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()
}

fn deliver(kind: &str, body: serde_json::Value) -> hookline_core::Result<Normalized> {
    let bytes = serde_json::to_vec(&body).expect("serialize payload");
    let envelope = RawEventEnvelope::parse(EventKind::from_header(Some(kind)), &bytes)?;
    normalize(&envelope, received_at())
}

fn pull_request(action: &str, merged: bool) -> serde_json::Value {
    json!({
        "action": action,
        "number": 12,
        "pull_request": {
            "id": 7,
            "user": {"login": "bob"},
            "head": {"ref": "feat"},
            "base": {"ref": "main"},
            "merged": merged
        },
        "repository": {"full_name": "octo/hello"}
    })
}

/// A GitHub push delivery produces one push record with the branch name and
/// short commit hash.
#[test]
fn push_produces_single_push_record() {
    let outcome = deliver(
        "push",
        json!({
            "ref": "refs/heads/main",
            "before": "0000000000000000000000000000000000000000",
            "after": "abcdef1234567890abcdef1234567890abcdef12",
            "pusher": {"name": "alice", "email": "alice@example.com"},
            "repository": {"full_name": "octo/hello"}
        }),
    )
    .expect("push normalizes");

    let Normalized::Record(record) = outcome else { panic!("expected a record, got {outcome:?}") };
    assert_eq!(record.action_type, ActionType::Push);
    assert_eq!(record.author, "alice");
    assert_eq!(record.to_branch, "main");
    assert_eq!(record.from_branch, None);
    assert_eq!(record.request_id, "abcdef12");
    assert_eq!(record.timestamp, received_at());
}

/// Opened pull requests copy author and branches verbatim.
#[test]
fn opened_pull_request_produces_pull_request_record() {
    let Normalized::Record(record) = deliver("pull_request", pull_request("opened", false)).unwrap()
    else {
        panic!("opened pull request should be recorded");
    };

    assert_eq!(record.action_type, ActionType::PullRequest);
    assert_eq!(record.author, "bob");
    assert_eq!(record.from_branch.as_deref(), Some("feat"));
    assert_eq!(record.to_branch, "main");
    assert_eq!(record.request_id, "7");
}

/// A closed and merged pull request is recorded as a merge.
#[test]
fn merged_pull_request_produces_merge_record() {
    let Normalized::Record(record) = deliver("pull_request", pull_request("closed", true)).unwrap()
    else {
        panic!("merged pull request should be recorded");
    };

    assert_eq!(record.action_type, ActionType::Merge);
    assert_eq!(record.from_branch.as_deref(), Some("feat"));
}

/// Closing without merging, and other actions, produce nothing.
#[test]
fn other_pull_request_actions_are_ignored() {
    for action in ["closed", "synchronize", "reopened", "edited", "labeled"] {
        let outcome = deliver("pull_request", pull_request(action, false)).unwrap();
        assert_eq!(
            outcome,
            Normalized::Ignored(IgnoreReason::PullRequestAction(action.to_string())),
            "action {action} should be ignored"
        );
    }
}

/// Event kinds other than push and pull_request are accepted and ignored.
#[test]
fn unsupported_event_kinds_are_ignored() {
    let outcome = deliver("issues", json!({"action": "opened"})).unwrap();
    assert_eq!(outcome, Normalized::Ignored(IgnoreReason::UnsupportedEvent("issues".into())));
}

/// Missing nested fields surface as malformed payloads naming the kind.
#[test]
fn missing_fields_are_malformed() {
    let err = deliver(
        "pull_request",
        json!({"action": "opened", "pull_request": {"id": 1, "user": {"login": "bob"}}}),
    )
    .unwrap_err();

    match err {
        HooklineError::MalformedPayload { event_kind, reason } => {
            assert_eq!(event_kind, "pull_request");
            assert!(reason.contains("head"), "reason should name the field: {reason}");
        },
        other => panic!("expected MalformedPayload, got {other:?}"),
    }
}

/// Wrongly typed fields are malformed too.
#[test]
fn mistyped_fields_are_malformed() {
    let err = deliver("push", json!({"ref": 42, "pusher": {"name": "alice"}})).unwrap_err();
    assert_eq!(err.code(), "E1001");
}

/// Replaying the same push yields two identical records; there is no dedup.
#[test]
fn replayed_push_is_not_deduplicated() {
    let body = json!({"ref": "refs/heads/main", "after": "abcdef1234", "pusher": {"name": "alice"}});

    let first = deliver("push", body.clone()).unwrap();
    let second = deliver("push", body).unwrap();

    assert!(matches!(first, Normalized::Record(_)));
    assert_eq!(first, second);
}
