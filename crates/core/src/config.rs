// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Campaign configuration.
//!
//! A [`CampaignConfig`] is immutable once accepted: the coordinator
//! validates it, wraps it in an `Arc`, and every later phase reads the
//! same snapshot.

use crate::id::SessionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive bounds on the requested degree of parallelism.
pub const MIN_WORKERS: u32 = 1;
pub const MAX_WORKERS: u32 = 100;

/// How deeply each drone researches its sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Basic,
    Standard,
    Deep,
}

crate::simple_display! {
    Depth {
        Basic => "basic",
        Standard => "standard",
        Deep => "deep",
    }
}

/// Campaign priority; drives the fleet's resource sizing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

crate::simple_display! {
    Priority {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

/// Output format for the rendered report artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Markdown,
    Json,
}

crate::simple_display! {
    OutputFormat {
        Markdown => "markdown",
        Json => "json",
    }
}

/// Errors rejecting a config at accept time. No session is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker_count {0} outside {MIN_WORKERS}..={MAX_WORKERS}")]
    WorkerCountOutOfRange(u32),
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("timeout_minutes must be at least 1")]
    ZeroTimeout,
}

/// Immutable configuration for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub session_id: SessionId,
    pub topic: String,
    pub worker_count: u32,
    pub depth: Depth,
    pub priority: Priority,
    pub timeout_minutes: u64,
    pub output_format: OutputFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_template: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_hints: Vec<String>,
    pub created_at_ms: u64,
}

impl CampaignConfig {
    /// Validate bounds and required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.worker_count) {
            return Err(ConfigError::WorkerCountOutOfRange(self.worker_count));
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.timeout_minutes == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Session wall-clock budget.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_minutes * 60)
    }
}

crate::builder! {
    pub struct CampaignConfigBuilder => CampaignConfig {
        session_id: SessionId = SessionId::new(),
        topic: String = String::from("test topic"),
        worker_count: u32 = 3,
        depth: Depth = Depth::Standard,
        priority: Priority = Priority::Normal,
        timeout_minutes: u64 = 5,
        output_format: OutputFormat = OutputFormat::Markdown,
        workflow_template: Option<String> = None,
        source_hints: Vec<String> = Vec::new(),
        created_at_ms: u64 = 1_700_000_000_000,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
