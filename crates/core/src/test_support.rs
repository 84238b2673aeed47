// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::result::{ResultStatus, WorkerResult};
use crate::worker::WorkerId;
use serde_json::json;

/// A completed result for `worker` with a small findings payload.
pub fn completed_result(worker: &str) -> WorkerResult {
    WorkerResult {
        worker_id: WorkerId::new(worker),
        status: ResultStatus::Completed,
        data: json!({
            "findings": [format!("finding from {worker}")],
            "sources": [format!("https://example.org/{worker}")],
        }),
        error_message: None,
        completed_at_ms: 1_700_000_060_000,
        processing_time_ms: 1_200,
    }
}

/// A failed result for `worker` with the given error message.
pub fn failed_result(worker: &str, message: &str) -> WorkerResult {
    WorkerResult {
        worker_id: WorkerId::new(worker),
        status: ResultStatus::Failed,
        data: json!(null),
        error_message: Some(message.to_string()),
        completed_at_ms: 1_700_000_060_000,
        processing_time_ms: 800,
    }
}
