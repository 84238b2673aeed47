// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Language-model adapter port.
//!
//! Decomposes a topic into sub-queries, writes per-drone instructions,
//! and drafts the narrative report. The coordinator's correctness does
//! not depend on adapter quality, only on this contract, so the shipped
//! [`OutlineModel`] is a deterministic template expansion; a real
//! generative backend slots in behind the same trait.

use async_trait::async_trait;
use dn_core::{Analysis, CampaignConfig, Depth, ReportDraft, ReportSection, WorkerResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the language-model adapter.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("sub-query generation failed: {0}")]
    SubQueries(String),
    #[error("instruction generation failed: {0}")]
    Instructions(String),
    #[error("report generation failed: {0}")]
    Report(String),
}

/// Instructions dispatched to one drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    pub sub_query: String,
    pub depth: Depth,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_hints: Vec<String>,
}

/// Port to the generative adapter.
#[async_trait]
pub trait ModelAdapter: Clone + Send + Sync + 'static {
    /// Up to `n` sub-queries covering `topic`. May return fewer.
    async fn sub_queries(&self, topic: &str, n: u32) -> Result<Vec<String>, ModelError>;

    /// Instructions for the drone assigned `sub_query`.
    async fn instructions(
        &self,
        config: &CampaignConfig,
        sub_query: &str,
    ) -> Result<Instructions, ModelError>;

    /// Draft the narrative report from collected results and analysis.
    async fn report(
        &self,
        config: &CampaignConfig,
        results: &[WorkerResult],
        analysis: &Analysis,
    ) -> Result<ReportDraft, ModelError>;
}

/// Research angles the outline model cycles through when decomposing a
/// topic. Past the list, angles repeat with a facet number.
const ANGLES: [&str; 8] = [
    "overview and key definitions",
    "current state of the art",
    "key players and stakeholders",
    "risks and open problems",
    "recent developments",
    "methodologies and approaches",
    "case studies and applications",
    "future directions",
];

/// Deterministic template-based adapter.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutlineModel;

impl OutlineModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelAdapter for OutlineModel {
    async fn sub_queries(&self, topic: &str, n: u32) -> Result<Vec<String>, ModelError> {
        let queries = (0..n as usize)
            .map(|i| {
                let angle = ANGLES[i % ANGLES.len()];
                if i < ANGLES.len() {
                    format!("{topic}: {angle}")
                } else {
                    format!("{topic}: {angle} (facet {})", i / ANGLES.len() + 1)
                }
            })
            .collect();
        Ok(queries)
    }

    async fn instructions(
        &self,
        config: &CampaignConfig,
        sub_query: &str,
    ) -> Result<Instructions, ModelError> {
        Ok(Instructions {
            sub_query: sub_query.to_string(),
            depth: config.depth,
            source_hints: config.source_hints.clone(),
        })
    }

    async fn report(
        &self,
        config: &CampaignConfig,
        results: &[WorkerResult],
        analysis: &Analysis,
    ) -> Result<ReportDraft, ModelError> {
        let sections = results
            .iter()
            .map(|result| ReportSection {
                title: format!("Findings from {}", result.worker_id),
                prose: match &result.error_message {
                    Some(message) => format!(
                        "{} reported a failure: {message}.",
                        result.worker_id
                    ),
                    None => format!(
                        "{} completed its sub-query in {} ms and contributed {} data points.",
                        result.worker_id,
                        result.processing_time_ms,
                        result.data_points()
                    ),
                },
                data: (!result.data.is_null()).then(|| result.data.clone()),
                insights: analysis
                    .insights
                    .iter()
                    .filter(|insight| insight.contains(result.worker_id.as_str()))
                    .cloned()
                    .collect(),
            })
            .collect();

        let aggregated_data = serde_json::Value::Object(
            results
                .iter()
                .map(|r| (r.worker_id.to_string(), r.data.clone()))
                .collect(),
        );

        Ok(ReportDraft {
            title: format!("Research report: {}", config.topic),
            executive_summary: format!(
                "{} {} of the fleet reported back.",
                analysis.summary,
                fmt_rate(analysis.completion_rate)
            ),
            sections,
            methodology: format!(
                "The topic was decomposed into {} sub-queries at {} depth, each \
                 researched by an independent drone; findings were aggregated in \
                 arrival order.",
                results.len(),
                config.depth
            ),
            aggregated_data,
        })
    }
}

fn fmt_rate(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeModel;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Instructions, ModelAdapter, ModelError};
    use async_trait::async_trait;
    use dn_core::{Analysis, CampaignConfig, ReportDraft, WorkerResult};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FakeModelState {
        /// Cap on sub-queries regardless of what was requested.
        max_sub_queries: Option<u32>,
        fail_report: bool,
        report_calls: usize,
    }

    /// Fake generative adapter: canned sub-queries, optional caps and
    /// scripted report failure.
    #[derive(Clone)]
    pub struct FakeModel {
        inner: Arc<Mutex<FakeModelState>>,
    }

    impl Default for FakeModel {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeModel {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeModelState {
                    max_sub_queries: None,
                    fail_report: false,
                    report_calls: 0,
                })),
            }
        }

        /// Return at most `n` sub-queries no matter how many are asked for.
        pub fn cap_sub_queries(&self, n: u32) {
            self.inner.lock().max_sub_queries = Some(n);
        }

        /// Make `report` fail.
        pub fn fail_report(&self) {
            self.inner.lock().fail_report = true;
        }

        pub fn report_calls(&self) -> usize {
            self.inner.lock().report_calls
        }
    }

    #[async_trait]
    impl ModelAdapter for FakeModel {
        async fn sub_queries(&self, topic: &str, n: u32) -> Result<Vec<String>, ModelError> {
            let n = match self.inner.lock().max_sub_queries {
                Some(cap) => n.min(cap),
                None => n,
            };
            Ok((1..=n).map(|i| format!("{topic} [{i}]")).collect())
        }

        async fn instructions(
            &self,
            config: &CampaignConfig,
            sub_query: &str,
        ) -> Result<Instructions, ModelError> {
            Ok(Instructions {
                sub_query: sub_query.to_string(),
                depth: config.depth,
                source_hints: config.source_hints.clone(),
            })
        }

        async fn report(
            &self,
            config: &CampaignConfig,
            results: &[WorkerResult],
            analysis: &Analysis,
        ) -> Result<ReportDraft, ModelError> {
            {
                let mut state = self.inner.lock();
                state.report_calls += 1;
                if state.fail_report {
                    return Err(ModelError::Report("scripted failure".to_string()));
                }
            }
            // Delegate the draft shape to the deterministic model.
            super::OutlineModel.report(config, results, analysis).await
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
