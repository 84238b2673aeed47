// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Happy path: a small fleet where every drone reports back.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn three_workers_all_complete() {
    let harness = Harness::new();
    let session = "cmp-happy";
    for worker in ["drone-1", "drone-2", "drone-3"] {
        harness
            .add_drone(session, worker, DroneScript::Complete(Duration::from_millis(20)))
            .await;
    }

    let outcome = harness
        .coordinator
        .run(harness.config(session, 3))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 3);
    assert_eq!(outcome.metrics.workers_completed, 3);
    assert_eq!(outcome.metrics.workers_failed, 0);
    assert!(outcome.metrics.cost_estimate_micros > 0);
    assert!(outcome.error.is_none());

    // The structured report is persisted under the returned reference.
    let report_id = outcome.report_id.unwrap();
    let stored = harness.stored_report(report_id.as_str()).await.unwrap();
    assert_eq!(stored["session_id"], session);
    assert_eq!(stored["metadata"]["result_count"], 3);
    assert_eq!(stored["sections"].as_array().unwrap().len(), 3);

    // The rendered report references every worker's raw artifact.
    let text = harness.final_report_text(session);
    for worker in ["drone-1", "drone-2", "drone-3"] {
        assert!(text.contains(&format!("worker_{worker}.json")), "missing {worker}");
        assert!(harness
            .reports_dir()
            .join(format!("results_{session}/worker_{worker}.json"))
            .exists());
    }

    // No instances, topics, subscriptions, or sessions leak.
    assert_eq!(harness.compute.live_count(), 0);
    assert!(harness.bus.topic_names().is_empty());
    assert!(harness.bus.subscription_names().is_empty());
    assert!(harness.coordinator.registry().is_empty());
}

#[tokio::test]
async fn single_worker_campaign_completes() {
    let harness = Harness::new();
    let session = "cmp-single";
    harness
        .add_drone(session, "drone-1", DroneScript::Complete(Duration::from_millis(5)))
        .await;

    let outcome = harness
        .coordinator
        .run(harness.config(session, 1))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 1);
    assert_eq!(outcome.metrics.workers_completed, 1);
}

#[tokio::test]
async fn replaying_the_same_results_reproduces_the_report() {
    // Round-trip law: identical inputs through deterministic analyzer
    // and model give the same report body.
    let first = run_fixed_campaign("cmp-replay-a").await;
    let second = run_fixed_campaign("cmp-replay-b").await;
    assert_eq!(first["title"], second["title"]);
    assert_eq!(first["executive_summary"], second["executive_summary"]);
    assert_eq!(first["sections"], second["sections"]);
    assert_eq!(first["aggregated_data"], second["aggregated_data"]);
}

async fn run_fixed_campaign(session: &str) -> serde_json::Value {
    let harness = Harness::new();
    // Staggered delays pin the arrival order, so the section order is
    // comparable across runs.
    harness
        .add_drone(session, "drone-1", DroneScript::Complete(Duration::from_millis(5)))
        .await;
    harness
        .add_drone(session, "drone-2", DroneScript::Complete(Duration::from_millis(80)))
        .await;
    let outcome = harness
        .coordinator
        .run(harness.config(session, 2))
        .await
        .unwrap();
    let report_id = outcome.report_id.unwrap();
    let mut stored = harness.stored_report(report_id.as_str()).await.unwrap();
    // Strip identity and timing, which legitimately differ per run.
    let object = stored.as_object_mut().unwrap();
    object.remove("id");
    object.remove("session_id");
    object.remove("created_at_ms");
    object.remove("metadata");
    stored
}
