// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analyzer output types.
//!
//! [`Analysis`] feeds report generation; it is not the final narrative.
//! `statistics` uses a `BTreeMap` so identical inputs serialize
//! identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recurring structure observed across worker payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub description: String,
    /// How many results exhibit the pattern.
    pub frequency: u32,
    /// Fraction of results exhibiting the pattern, in [0, 1].
    pub confidence: f64,
}

/// Deterministic summary of the collected results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Completed results over total results, in [0, 1].
    pub completion_rate: f64,
    pub summary: String,
    pub patterns: Vec<Pattern>,
    pub insights: Vec<String>,
    pub statistics: BTreeMap<String, f64>,
}
