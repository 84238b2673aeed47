// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-level campaign errors.
//!
//! Per-worker and per-message failures are absorbed where they occur;
//! only these kinds reach the caller. Correlation identifiers stay on
//! log records, never in the error text.

use thiserror::Error;

/// Fatal campaign errors, tagged by kind.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Rejected at accept; no session was created.
    #[error("invalid config: {0}")]
    ConfigInvalid(#[from] dn_core::ConfigError),

    /// A session with this ID is already active.
    #[error("session already active: {0}")]
    DuplicateSession(String),

    /// Zero workers provisioned (or no sub-queries to provision for).
    #[error("{0}")]
    ProvisioningExhausted(String),

    /// The language-model adapter could not produce the report.
    #[error("report generation failed: {0}")]
    ReportGeneration(String),

    /// The structured report could not be persisted to the store.
    #[error("report persistence failed: {0}")]
    StoreWrite(String),

    /// The session was cancelled before reaching a natural end.
    #[error("campaign cancelled")]
    Cancelled,

    /// Engine invariant violation (state machine or plumbing bug).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CampaignError {
    /// Stable kind tag surfaced to callers and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CampaignError::ConfigInvalid(_) => "config_invalid",
            CampaignError::DuplicateSession(_) => "config_invalid",
            CampaignError::ProvisioningExhausted(_) => "provisioning_exhausted",
            CampaignError::ReportGeneration(_) => "report_generation_failure",
            CampaignError::StoreWrite(_) => "store_write_failure",
            CampaignError::Cancelled => "cancelled",
            CampaignError::Internal(_) => "internal_error",
        }
    }
}
