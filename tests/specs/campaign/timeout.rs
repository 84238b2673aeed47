// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout ends collection but still reports on what arrived.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn timeout_reports_on_partial_results() {
    let harness = Harness::new();
    let session = "cmp-timeout";
    // 6 fast drones, 4 that never publish.
    for i in 1..=6 {
        harness
            .add_drone(
                session,
                &format!("drone-{i}"),
                DroneScript::Complete(Duration::from_millis(10)),
            )
            .await;
    }
    for i in 7..=10 {
        harness
            .add_drone(session, &format!("drone-{i}"), DroneScript::Silent)
            .await;
    }

    let mut config = harness.config(session, 10);
    config.timeout_minutes = 1;

    let coordinator = harness.coordinator.clone();
    let run = tokio::spawn(async move { coordinator.run(config).await });

    // Wait until the six fast results are in, then push the clock past
    // the budget.
    let registry = harness.coordinator.registry().clone();
    let session_id = dn_core::SessionId::from_string(session);
    let collected = wait_for(SPEC_WAIT_MAX, || {
        registry
            .get(&session_id)
            .map(|s| s.result_count() >= 6)
            .unwrap_or(false)
    })
    .await;
    assert!(collected, "six results should arrive before the deadline");
    harness.clock.advance(Duration::from_secs(61));

    let outcome = run.await.unwrap().unwrap();
    assert_eq!(outcome.status, CampaignStatus::Timeout);
    assert_eq!(outcome.metrics.workers_provisioned, 10);
    assert_eq!(
        outcome.metrics.workers_completed + outcome.metrics.workers_failed,
        6
    );

    // Reporting still ran over the six collected results.
    let stored = harness
        .stored_report(outcome.report_id.unwrap().as_str())
        .await
        .unwrap();
    assert_eq!(stored["metadata"]["result_count"], 6);

    // Cleanup ran: no instance or bus resource survives.
    assert_eq!(harness.compute.live_count(), 0);
    assert!(harness.bus.topic_names().is_empty());
    assert!(harness.bus.subscription_names().is_empty());

    let progress = harness.progress_text(session);
    assert!(progress.contains("- status: timeout"));
    assert!(progress.contains("campaign timed out"));
}

#[tokio::test]
async fn timeout_lands_exactly_on_the_budget() {
    let harness = Harness::new();
    let session = "cmp-late";
    harness
        .add_drone(session, "drone-1", DroneScript::Silent)
        .await;

    let mut config = harness.config(session, 1);
    config.timeout_minutes = 1;

    let coordinator = harness.coordinator.clone();
    let run = tokio::spawn(async move { coordinator.run(config).await });

    // Let the campaign reach its collect phase, then advance the clock
    // to precisely the budget: exactly at `timeout_minutes` counts as
    // timed out.
    let registry = harness.coordinator.registry().clone();
    let session_id = dn_core::SessionId::from_string(session);
    let running = wait_for(SPEC_WAIT_MAX, || {
        registry
            .get(&session_id)
            .map(|s| s.status() == CampaignStatus::Running)
            .unwrap_or(false)
    })
    .await;
    assert!(running, "campaign should be running before the deadline");
    harness.clock.advance(Duration::from_secs(60));

    let outcome = run.await.unwrap().unwrap();
    assert_eq!(outcome.status, CampaignStatus::Timeout);
    assert_eq!(outcome.metrics.workers_completed, 0);
    // Timeout with zero results still renders and persists a report.
    assert!(outcome.report_id.is_some());
}
