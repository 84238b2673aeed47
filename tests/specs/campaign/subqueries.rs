// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The effective fleet never exceeds what the adapter decomposed.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn adapter_shortfall_reduces_the_fleet() {
    let harness = Harness::new();
    let session = "cmp-short";
    // Ten workers requested, four sub-queries produced.
    harness.model.cap_sub_queries(4);
    for i in 1..=4 {
        harness
            .add_drone(
                session,
                &format!("drone-{i}"),
                DroneScript::Complete(Duration::from_millis(10)),
            )
            .await;
    }

    let outcome = harness
        .coordinator
        .run(harness.config(session, 10))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Completed);
    assert_eq!(outcome.metrics.workers_provisioned, 4);
    assert_eq!(outcome.metrics.workers_completed, 4);

    // Workers 5..10 were never provisioned.
    assert_eq!(harness.compute.created_ids().len(), 4);
    assert!(!harness.compute.created_ids().contains(&"drone-5".to_string()));

    // The reduction is journalled.
    let progress = harness.progress_text(session);
    assert!(progress.contains(
        "requested 10 workers, adapter produced 4 sub-queries; fleet reduced to 4"
    ));
}

#[tokio::test]
async fn zero_sub_queries_fail_the_campaign() {
    let harness = Harness::new();
    harness.model.cap_sub_queries(0);
    let outcome = harness
        .coordinator
        .run(harness.config("cmp-none", 3))
        .await
        .unwrap();

    assert_eq!(outcome.status, CampaignStatus::Failed);
    assert!(outcome
        .error
        .as_deref()
        .unwrap()
        .starts_with("provisioning_exhausted"));
    assert_eq!(harness.compute.created_ids().len(), 0);
}
