// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured findings published by workers.
//!
//! This is the wire schema drones publish to the per-campaign topic;
//! the result queue decodes bus payloads straight into [`WorkerResult`].

use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

/// Outcome reported by a worker for its sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Completed,
    Failed,
}

crate::simple_display! {
    ResultStatus {
        Completed => "completed",
        Failed => "failed",
    }
}

/// One worker's structured findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub worker_id: WorkerId,
    pub status: ResultStatus,
    /// Structured payload; shape is defined by the workers.
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub completed_at_ms: u64,
    pub processing_time_ms: u64,
}

impl WorkerResult {
    /// Number of data points in the payload: entries of a top-level
    /// array or object, else 1 for any other non-null value.
    pub fn data_points(&self) -> u64 {
        match &self.data {
            serde_json::Value::Array(items) => items.len() as u64,
            serde_json::Value::Object(map) => map.len() as u64,
            serde_json::Value::Null => 0,
            _ => 1,
        }
    }
}

crate::builder! {
    pub struct WorkerResultBuilder => WorkerResult {
        worker_id: WorkerId = WorkerId::new("drone-1"),
        status: ResultStatus = ResultStatus::Completed,
        data: serde_json::Value = serde_json::json!({"findings": ["f1"]}),
        error_message: Option<String> = None,
        completed_at_ms: u64 = 1_700_000_060_000,
        processing_time_ms: u64 = 1_500,
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
