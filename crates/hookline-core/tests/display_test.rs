//! Snapshot tests for rendered event sentences.

use chrono::{TimeZone, Utc};
use hookline_core::{format_record, format_timestamp, ActionType, EventRecord, Timestamp};

fn record(action_type: ActionType, from_branch: Option<&str>) -> EventRecord {
    EventRecord {
        request_id: "7".to_string(),
        action_type,
        author: "bob".to_string(),
        from_branch: from_branch.map(str::to_string),
        to_branch: "main".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, 5, 14, 3, 0).unwrap(),
    }
}

#[test]
fn push_sentence() {
    insta::assert_snapshot!(
        format_record(&record(ActionType::Push, None)),
        @r#""bob" pushed to "main" on 05 January 2024 - 02:03 PM UTC"#
    );
}

#[test]
fn pull_request_sentence() {
    insta::assert_snapshot!(
        format_record(&record(ActionType::PullRequest, Some("feat"))),
        @r#""bob" submitted a pull request from "feat" to "main" on 05 January 2024 - 02:03 PM UTC"#
    );
}

#[test]
fn merge_sentence() {
    insta::assert_snapshot!(
        format_record(&record(ActionType::Merge, Some("feat"))),
        @r#""bob" merged branch "feat" to "main" on 05 January 2024 - 02:03 PM UTC"#
    );
}

#[test]
fn text_timestamps() {
    assert_eq!(format_timestamp(None), "Unknown time");
    assert_eq!(
        format_timestamp(Some(&Timestamp::from("2024-01-05T10:00:00Z"))),
        "05 January 2024 - 10:00 AM UTC"
    );
    assert_eq!(format_timestamp(Some(&Timestamp::from("not a date"))), "not a date");
}
