// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn draft() -> ReportDraft {
    ReportDraft {
        title: "Findings: AI safety".to_string(),
        executive_summary: "Three drones covered three angles.".to_string(),
        sections: vec![ReportSection {
            title: "Angle 1".to_string(),
            prose: "What drone-1 found.".to_string(),
            data: Some(json!({"sources": 4})),
            insights: vec!["insight".to_string()],
        }],
        methodology: "Fan-out over 3 sub-queries.".to_string(),
        aggregated_data: json!({"drone-1": {"sources": 4}}),
    }
}

#[test]
fn into_report_stamps_identity() {
    let id = ReportId::from_string("rpt-fixed");
    let session = SessionId::from_string("cmp-fixed");
    let report = draft().into_report(
        id.clone(),
        session.clone(),
        ReportMetadata {
            result_count: 3,
            duration_ms: 12_000,
            ..Default::default()
        },
        1_700_000_099_000,
    );
    assert_eq!(report.id, id);
    assert_eq!(report.session_id, session);
    assert_eq!(report.metadata.result_count, 3);
    assert_eq!(report.created_at_ms, 1_700_000_099_000);
    assert_eq!(report.sections.len(), 1);
}

#[test]
fn report_serde_round_trips_structurally() {
    let report = draft().into_report(
        ReportId::from_string("rpt-rt"),
        SessionId::from_string("cmp-rt"),
        ReportMetadata::default(),
        1,
    );
    let value = serde_json::to_value(&report).unwrap();
    let back: Report = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);
}

#[test]
fn cost_estimate_is_deterministic_and_rounds_up() {
    // 5 workers, 90s => 2 minutes, at 1000 micros/min
    assert_eq!(Metrics::cost_estimate(5, 90_000, 1_000), 10_000);
    // repeated call gives the same answer
    assert_eq!(Metrics::cost_estimate(5, 90_000, 1_000), 10_000);
    // sub-minute campaigns bill one minute
    assert_eq!(Metrics::cost_estimate(2, 500, 1_000), 2_000);
    // zero workers cost nothing
    assert_eq!(Metrics::cost_estimate(0, 600_000, 1_000), 0);
}

#[test]
fn empty_sections_and_sources_are_omitted() {
    let section = ReportSection {
        title: "t".to_string(),
        prose: "p".to_string(),
        data: None,
        insights: vec![],
    };
    let json = serde_json::to_string(&section).unwrap();
    assert!(!json.contains("data"));
    assert!(!json.contains("insights"));
}
