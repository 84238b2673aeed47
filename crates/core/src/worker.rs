// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker (drone) identity and per-worker lifecycle state.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a worker within its campaign.
///
/// By convention the coordinator names workers `drone-{n}` in dispatch
/// order, which keeps the positional sub-query pairing readable in logs
/// and journal files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl WorkerId {
    /// Create a new WorkerId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The conventional ID for the worker at `index` (zero-based).
    pub fn at_index(index: usize) -> Self {
        Self(format!("drone-{}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for WorkerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of one worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Provisioning requested, no endpoint yet.
    Pending,
    /// Instance up, endpoint resolved, instructions not yet sent.
    Deployed,
    /// Instructions accepted, working.
    Running,
    /// Result with `status=completed` arrived.
    Completed,
    /// Result with `status=failed` arrived, or dispatch failed.
    Failed,
    /// Liveness probe missed; not itself terminal for the session.
    Unhealthy,
}

crate::simple_display! {
    WorkerStatus {
        Pending => "pending",
        Deployed => "deployed",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Unhealthy => "unhealthy",
    }
}

impl WorkerStatus {
    /// Whether a result has been recorded (or the worker can never produce one).
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerStatus::Completed | WorkerStatus::Failed)
    }

    /// Whether the liveness probe should visit this worker.
    pub fn is_probeable(self) -> bool {
        matches!(
            self,
            WorkerStatus::Deployed | WorkerStatus::Running | WorkerStatus::Unhealthy
        )
    }
}

/// Per-worker record in the session's worker table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: WorkerId,
    /// Resolved after provisioning succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub status: WorkerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_healthy_at_ms: Option<u64>,
}

impl WorkerInfo {
    /// A freshly requested worker with no endpoint yet.
    pub fn pending(id: WorkerId) -> Self {
        Self {
            id,
            endpoint: None,
            status: WorkerStatus::Pending,
            deployed_at_ms: None,
            last_healthy_at_ms: None,
        }
    }

    /// Record a successful deployment.
    pub fn mark_deployed(&mut self, endpoint: String, now_ms: u64) {
        self.endpoint = Some(endpoint);
        self.status = WorkerStatus::Deployed;
        self.deployed_at_ms = Some(now_ms);
        self.last_healthy_at_ms = Some(now_ms);
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
