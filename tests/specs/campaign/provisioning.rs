// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning exhaustion fails the session without leaking anything.

use crate::prelude::*;

#[tokio::test]
async fn zero_provisioned_workers_fail_the_campaign() {
    let harness = Harness::new();
    let session = "cmp-exhausted";
    harness.compute.fail_all();

    let outcome = harness
        .coordinator
        .run(harness.config(session, 4))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Failed);
    assert_eq!(outcome.metrics.workers_provisioned, 0);
    assert_eq!(outcome.metrics.workers_completed, 0);
    assert_eq!(outcome.metrics.workers_failed, 0);
    assert!(outcome.report_id.is_none());
    assert!(outcome
        .error
        .as_deref()
        .unwrap()
        .starts_with("provisioning_exhausted"));

    // All four attempts ran before the session failed.
    assert_eq!(harness.compute.created_ids().len(), 4);

    // No topic or subscription leaks, no report, no active session.
    assert!(harness.bus.topic_names().is_empty());
    assert!(harness.bus.subscription_names().is_empty());
    assert_eq!(harness.store.document_count(), 0);
    assert!(harness.coordinator.registry().is_empty());
    assert_eq!(harness.compute.live_count(), 0);
}

#[tokio::test]
async fn hundred_worker_fleet_provisions_in_parallel() {
    let harness = Harness::new();
    let session = "cmp-wide";
    for i in 1..=100 {
        let worker = format!("drone-{i}");
        harness
            .add_drone(session, &worker, DroneScript::Complete(std::time::Duration::from_millis(5)))
            .await;
    }

    let outcome = harness
        .coordinator
        .run(harness.config(session, 100))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 100);
    assert_eq!(outcome.metrics.workers_completed, 100);
    assert_eq!(harness.compute.live_count(), 0);
}
