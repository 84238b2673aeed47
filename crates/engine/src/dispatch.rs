// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instruction dispatch to drone endpoints.
//!
//! `POST /instructions` with a `research_command` envelope; any
//! non-200 answer is a dispatch failure for that worker.

use dn_adapters::http::{self, HttpError};
use dn_adapters::Instructions;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const INSTRUCTIONS_PATH: &str = "/instructions";

/// Errors dispatching instructions to one worker.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("instruction encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("worker rejected instructions (status {0})")]
    Rejected(u16),
}

#[derive(Serialize)]
struct InstructionEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    instructions: &'a Instructions,
    timestamp: u64,
}

/// Send one worker its instructions.
pub async fn send_instructions(
    endpoint: &str,
    instructions: &Instructions,
    timestamp_ms: u64,
    timeout: Duration,
) -> Result<(), DispatchError> {
    let envelope = InstructionEnvelope {
        kind: "research_command",
        instructions,
        timestamp: timestamp_ms,
    };
    let body = serde_json::to_string(&envelope).map_err(|e| DispatchError::Encode(e.to_string()))?;
    let response = http::post_json(endpoint, INSTRUCTIONS_PATH, &body, timeout).await?;
    if !response.is_ok() {
        return Err(DispatchError::Rejected(response.status));
    }
    Ok(())
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
