// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! At-least-once delivery: duplicate results are acked and dropped.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn double_delivery_counts_once() {
    let harness = Harness::new();
    let session = "cmp-dup";
    // drone-1's result is published twice by the bus.
    harness
        .add_drone(session, "drone-1", DroneScript::CompleteTimes(2))
        .await;
    harness
        .add_drone(session, "drone-2", DroneScript::Complete(Duration::from_millis(30)))
        .await;

    let outcome = harness
        .coordinator
        .run(harness.config(session, 2))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 2);
    assert_eq!(outcome.metrics.workers_completed, 2);
    assert_eq!(outcome.metrics.workers_failed, 0);

    // Exactly one result per worker made it into the report.
    let stored = harness
        .stored_report(outcome.report_id.unwrap().as_str())
        .await
        .unwrap();
    assert_eq!(stored["metadata"]["result_count"], 2);
    let sections = stored["sections"].as_array().unwrap();
    let drone1_sections = sections
        .iter()
        .filter(|s| s["title"].as_str().unwrap_or_default().contains("drone-1"))
        .count();
    assert_eq!(drone1_sections, 1);
}

#[tokio::test]
async fn many_duplicates_never_inflate_the_tally() {
    let harness = Harness::new();
    let session = "cmp-dup-many";
    harness
        .add_drone(session, "drone-1", DroneScript::CompleteTimes(5))
        .await;

    let outcome = harness
        .coordinator
        .run(harness.config(session, 1))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_completed, 1);
    assert_eq!(outcome.metrics.workers_failed, 0);
}
