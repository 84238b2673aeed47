// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-side failures are counted, not retried, and never fail the
//! session.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn failed_workers_are_counted_and_reported() {
    let harness = Harness::new();
    let session = "cmp-partial";
    for worker in ["drone-1", "drone-2", "drone-3"] {
        harness
            .add_drone(session, worker, DroneScript::Complete(Duration::from_millis(10)))
            .await;
    }
    harness
        .add_drone(session, "drone-4", DroneScript::Fail("source unreachable"))
        .await;
    harness
        .add_drone(session, "drone-5", DroneScript::Fail("quota exceeded"))
        .await;

    let outcome = harness
        .coordinator
        .run(harness.config(session, 5))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 5);
    assert_eq!(outcome.metrics.workers_completed, 3);
    assert_eq!(outcome.metrics.workers_failed, 2);

    // The report covers all five results, failures included.
    let stored = harness
        .stored_report(outcome.report_id.unwrap().as_str())
        .await
        .unwrap();
    assert_eq!(stored["metadata"]["result_count"], 5);
    let sections = stored["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 5);
    let prose: String = sections
        .iter()
        .map(|s| s["prose"].as_str().unwrap_or_default())
        .collect();
    assert!(prose.contains("source unreachable"));
    assert!(prose.contains("quota exceeded"));

    assert_eq!(harness.compute.live_count(), 0);
}

#[tokio::test]
async fn partial_fleet_still_runs_the_campaign() {
    // Two of four provisioning attempts fail; the survivors carry the
    // campaign.
    let harness = Harness::new();
    let session = "cmp-partial-fleet";
    harness
        .add_drone(session, "drone-1", DroneScript::Complete(Duration::from_millis(10)))
        .await;
    harness
        .add_drone(session, "drone-3", DroneScript::Complete(Duration::from_millis(10)))
        .await;
    harness.compute.fail_service("drone-2");
    harness.compute.fail_service("drone-4");

    let outcome = harness
        .coordinator
        .run(harness.config(session, 4))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 2);
    assert_eq!(outcome.metrics.workers_completed, 2);
    assert_eq!(outcome.metrics.workers_failed, 0);

    let progress = harness.progress_text(session);
    assert!(progress.contains("drone-2 failed to provision"));
    assert!(progress.contains("partial fleet: 2 of 4 workers provisioned"));
}
