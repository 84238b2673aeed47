// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured report and campaign metrics.
//!
//! The language-model adapter produces a [`ReportDraft`]; the
//! coordinator stamps identity and metadata onto it to make the
//! [`Report`] that is persisted to the document store and outlives the
//! session.

use crate::id::{ReportId, SessionId};
use serde::{Deserialize, Serialize};

/// Campaign-level counters and the deterministic cost estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub workers_provisioned: u32,
    pub workers_completed: u32,
    pub workers_failed: u32,
    pub total_duration_ms: u64,
    pub data_points: u64,
    /// `workers_provisioned × duration_minutes × rate`, in micro-dollars.
    pub cost_estimate_micros: u64,
}

impl Metrics {
    /// Deterministic post-hoc cost: instances × wall-clock minutes × rate.
    ///
    /// Duration is rounded up to whole minutes so a short campaign is
    /// never billed as zero.
    pub fn cost_estimate(provisioned: u32, duration_ms: u64, rate_micros_per_min: u64) -> u64 {
        let minutes = duration_ms.div_ceil(60_000).max(1);
        u64::from(provisioned) * minutes * rate_micros_per_min
    }
}

/// One section of the narrative report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub prose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
}

/// Provenance and measurement attached to a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    pub result_count: u32,
    pub duration_ms: u64,
    pub metrics: Metrics,
}

/// Narrative content produced by the language-model adapter, before the
/// coordinator assigns identity and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub title: String,
    pub executive_summary: String,
    pub sections: Vec<ReportSection>,
    pub methodology: String,
    pub aggregated_data: serde_json::Value,
}

impl ReportDraft {
    /// Stamp identity, metadata, and creation time onto the draft.
    pub fn into_report(
        self,
        id: ReportId,
        session_id: SessionId,
        metadata: ReportMetadata,
        created_at_ms: u64,
    ) -> Report {
        Report {
            id,
            session_id,
            title: self.title,
            executive_summary: self.executive_summary,
            sections: self.sections,
            methodology: self.methodology,
            aggregated_data: self.aggregated_data,
            metadata,
            created_at_ms,
        }
    }
}

/// The persisted structured report. Outlives its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub session_id: SessionId,
    pub title: String,
    pub executive_summary: String,
    pub sections: Vec<ReportSection>,
    pub methodology: String,
    pub aggregated_data: serde_json::Value,
    pub metadata: ReportMetadata,
    pub created_at_ms: u64,
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
