// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic analysis of collected results.
//!
//! Produces the completion rate, recurring payload patterns, a small
//! insight list, and summary statistics. Identical inputs always
//! produce identical output; the narrative report is generated
//! downstream from this.

use dn_core::{Analysis, Pattern, ResultStatus, WorkerResult};
use std::collections::BTreeMap;

/// Upper bound on reported patterns.
const MAX_PATTERNS: usize = 5;
/// Upper bound on reported insights.
const MAX_INSIGHTS: usize = 5;

/// Computes [`Analysis`] over a campaign's collected results.
pub struct Analyzer;

impl Analyzer {
    pub fn analyze(results: &[WorkerResult]) -> Analysis {
        let total = results.len();
        let completed = results
            .iter()
            .filter(|r| r.status == ResultStatus::Completed)
            .count();
        let failed = total - completed;
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        };

        let patterns = payload_patterns(results, total);
        let insights = build_insights(results, completed, failed);
        let statistics = build_statistics(results, completed, failed);

        Analysis {
            completion_rate,
            summary: format!("{completed} of {total} drones completed their sub-queries."),
            patterns,
            insights,
            statistics,
        }
    }
}

/// Shared top-level payload fields, ranked by frequency then name.
fn payload_patterns(results: &[WorkerResult], total: usize) -> Vec<Pattern> {
    let mut field_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for result in results {
        if let Some(object) = result.data.as_object() {
            for key in object.keys() {
                *field_counts.entry(key.as_str()).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, u32)> = field_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(MAX_PATTERNS)
        .map(|(field, frequency)| Pattern {
            name: format!("shared_field:{field}"),
            description: format!(
                "{frequency} of {total} worker payloads carry a `{field}` field"
            ),
            frequency,
            confidence: frequency as f64 / total.max(1) as f64,
        })
        .collect()
}

fn build_insights(results: &[WorkerResult], completed: usize, failed: usize) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(richest) = results
        .iter()
        .filter(|r| r.status == ResultStatus::Completed)
        .max_by(|a, b| {
            a.data_points()
                .cmp(&b.data_points())
                .then(b.worker_id.as_str().cmp(a.worker_id.as_str()))
        })
    {
        insights.push(format!(
            "{} contributed the most data points ({})",
            richest.worker_id,
            richest.data_points()
        ));
    }

    if failed > 0 {
        let mut failed_ids: Vec<&str> = results
            .iter()
            .filter(|r| r.status == ResultStatus::Failed)
            .map(|r| r.worker_id.as_str())
            .collect();
        failed_ids.sort_unstable();
        insights.push(format!(
            "{failed} drone(s) failed: {}",
            failed_ids.join(", ")
        ));
    }

    if completed > 0 {
        let slowest = results
            .iter()
            .filter(|r| r.status == ResultStatus::Completed)
            .map(|r| r.processing_time_ms)
            .max()
            .unwrap_or_default();
        let fastest = results
            .iter()
            .filter(|r| r.status == ResultStatus::Completed)
            .map(|r| r.processing_time_ms)
            .min()
            .unwrap_or_default();
        insights.push(format!(
            "processing time spread {fastest}..{slowest} ms across completions"
        ));
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

fn build_statistics(
    results: &[WorkerResult],
    completed: usize,
    failed: usize,
) -> BTreeMap<String, f64> {
    let mut statistics = BTreeMap::new();
    statistics.insert("results_total".to_string(), results.len() as f64);
    statistics.insert("results_completed".to_string(), completed as f64);
    statistics.insert("results_failed".to_string(), failed as f64);

    let data_points: u64 = results.iter().map(|r| r.data_points()).sum();
    statistics.insert("data_points".to_string(), data_points as f64);

    if !results.is_empty() {
        let times: Vec<u64> = results.iter().map(|r| r.processing_time_ms).collect();
        let sum: u64 = times.iter().sum();
        statistics.insert(
            "processing_ms_avg".to_string(),
            sum as f64 / times.len() as f64,
        );
        statistics.insert(
            "processing_ms_min".to_string(),
            *times.iter().min().unwrap_or(&0) as f64,
        );
        statistics.insert(
            "processing_ms_max".to_string(),
            *times.iter().max().unwrap_or(&0) as f64,
        );
    }

    statistics
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
