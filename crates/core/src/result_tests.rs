// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn wire_schema_round_trips() {
    let result = WorkerResult::builder()
        .worker_id(WorkerId::new("drone-3"))
        .status(ResultStatus::Failed)
        .error_message(Some("fetch timed out".to_string()))
        .build();
    let json = serde_json::to_string(&result).unwrap();
    let back: WorkerResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn error_message_omitted_when_absent() {
    let result = WorkerResult::builder().build();
    let json = serde_json::to_string(&result).unwrap();
    assert!(!json.contains("error_message"));
}

#[test]
fn decodes_worker_published_payload() {
    let raw = r#"{
        "worker_id": "drone-1",
        "status": "completed",
        "data": {"sources": ["a", "b"], "summary": "ok"},
        "completed_at_ms": 1700000061000,
        "processing_time_ms": 900
    }"#;
    let result: WorkerResult = serde_json::from_str(raw).unwrap();
    assert_eq!(result.worker_id, "drone-1");
    assert_eq!(result.status, ResultStatus::Completed);
    assert_eq!(result.data_points(), 2);
}

#[test]
fn data_points_counts_by_shape() {
    let mut result = WorkerResult::builder().data(json!([1, 2, 3])).build();
    assert_eq!(result.data_points(), 3);
    result.data = json!({"a": 1});
    assert_eq!(result.data_points(), 1);
    result.data = json!(null);
    assert_eq!(result.data_points(), 0);
    result.data = json!("scalar");
    assert_eq!(result.data_points(), 1);
}
