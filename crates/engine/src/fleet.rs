// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet manager: provisions, probes, and decommissions drone workers.
//!
//! Provisioning fans out one task per worker; each attempt succeeds or
//! fails independently and the caller decides what a partial fleet
//! means. The watch loop probes deployed workers on a fixed cadence and
//! marks silent ones unhealthy without ever aborting the session.

use crate::env::Settings;
use crate::queue;
use crate::session::Session;
use dn_adapters::http;
use dn_adapters::{ComputeAdapter, ServiceSpec};
use dn_core::{CampaignConfig, Clock, Priority, WorkerId, WorkerStatus};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Errors from fleet operations.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("provisioning {0} failed: {1}")]
    Provision(WorkerId, String),
    #[error("provisioning {0} cancelled")]
    Cancelled(WorkerId),
}

/// CPU/memory sizing for one worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTier {
    pub cpu_millis: u32,
    pub memory_mb: u32,
}

/// Fixed resource sizing per priority tier.
pub fn resources_for(priority: Priority) -> ResourceTier {
    match priority {
        Priority::Low => ResourceTier { cpu_millis: 250, memory_mb: 256 },
        Priority::Normal => ResourceTier { cpu_millis: 500, memory_mb: 512 },
        Priority::High => ResourceTier { cpu_millis: 1_000, memory_mb: 1_024 },
    }
}

/// Result of one provisioning attempt.
pub struct ProvisionOutcome {
    pub worker_id: WorkerId,
    pub endpoint: Result<String, FleetError>,
}

/// Provisions and monitors the drone fleet for campaigns.
///
/// Cheap to clone; provisioning tasks and the watch loop each hold
/// their own handle.
#[derive(Clone)]
pub struct FleetManager<P: ComputeAdapter, C: Clock> {
    compute: P,
    clock: C,
    settings: Settings,
}

impl<P: ComputeAdapter, C: Clock> FleetManager<P, C> {
    pub fn new(compute: P, clock: C, settings: Settings) -> Self {
        Self { compute, clock, settings }
    }

    /// Build the instance spec for one worker of this campaign.
    fn service_spec(&self, worker_id: &WorkerId, config: &CampaignConfig) -> ServiceSpec {
        let tier = resources_for(config.priority);
        ServiceSpec {
            image: self.settings.drone_image.clone(),
            cpu_millis: tier.cpu_millis,
            memory_mb: tier.memory_mb,
            env: vec![
                ("DN_SESSION_ID".to_string(), config.session_id.to_string()),
                ("DN_WORKER_ID".to_string(), worker_id.to_string()),
                (
                    "DN_RESULT_TOPIC".to_string(),
                    queue::topic_name(&config.session_id),
                ),
                (
                    "DN_ORCHESTRATOR_URL".to_string(),
                    self.settings.base_url.clone(),
                ),
                ("DN_DEPTH".to_string(), config.depth.to_string()),
            ],
        }
    }

    /// Provision one worker. Idempotent on `worker_id`: the compute
    /// port returns the existing instance on re-create.
    pub async fn provision(
        &self,
        worker_id: &WorkerId,
        config: &CampaignConfig,
    ) -> Result<String, FleetError> {
        let spec = self.service_spec(worker_id, config);
        let service = self
            .compute
            .create_service(
                &self.settings.project,
                &self.settings.region,
                worker_id.as_str(),
                &spec,
            )
            .await
            .map_err(|e| FleetError::Provision(worker_id.clone(), e.to_string()))?;
        tracing::info!(
            session_id = %config.session_id,
            worker_id = %worker_id,
            endpoint = %service.uri,
            "worker provisioned"
        );
        Ok(service.uri)
    }

    /// Provision `count` workers in parallel. Every attempt terminates
    /// before this returns; outcomes come back in worker order.
    pub async fn provision_fleet(
        &self,
        count: u32,
        config: &Arc<CampaignConfig>,
        cancel: &CancellationToken,
    ) -> Vec<ProvisionOutcome> {
        let mut tasks = JoinSet::new();
        for index in 0..count as usize {
            let worker_id = WorkerId::at_index(index);
            let manager = self.clone();
            let config = Arc::clone(config);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let endpoint = tokio::select! {
                    _ = cancel.cancelled() => Err(FleetError::Cancelled(worker_id.clone())),
                    result = manager.provision(&worker_id, &config) => result,
                };
                (index, ProvisionOutcome { worker_id, endpoint })
            });
        }

        let mut outcomes: Vec<Option<ProvisionOutcome>> =
            (0..count as usize).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, outcome)) = joined {
                outcomes[index] = Some(outcome);
            }
        }
        outcomes.into_iter().flatten().collect()
    }

    /// One liveness probe: `GET /health`, expecting `200 ok`.
    pub async fn health_check(&self, endpoint: &str) -> bool {
        match http::get(endpoint, "/health", self.settings.probe_timeout).await {
            Ok(response) => response.is_ok() && response.body.trim() == "ok",
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "health probe failed");
                false
            }
        }
    }

    /// Periodic liveness watch for a session's fleet.
    ///
    /// Probes every deployed/running worker each interval; failures
    /// mark the worker unhealthy, recoveries mark it running again.
    pub async fn watch(&self, session: Arc<Session>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.settings.health_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first interval tick fires immediately; skip it so freshly
        // deployed workers get a grace period.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let probes: Vec<(WorkerId, String)> = session
                .workers_snapshot()
                .into_iter()
                .filter(|w| w.status.is_probeable())
                .filter_map(|w| w.endpoint.clone().map(|e| (w.id, e)))
                .collect();

            let checks = probes.iter().map(|(id, endpoint)| {
                let id = id.clone();
                async move { (id, self.health_check(endpoint).await) }
            });

            for (worker_id, healthy) in futures_util::future::join_all(checks).await {
                if healthy {
                    let now_ms = self.clock.epoch_ms();
                    session.with_worker_mut(&worker_id, |info| {
                        info.last_healthy_at_ms = Some(now_ms);
                        if info.status == WorkerStatus::Unhealthy {
                            info.status = WorkerStatus::Running;
                        }
                    });
                } else {
                    let mut flipped = false;
                    session.with_worker_mut(&worker_id, |info| {
                        if info.status.is_probeable() && info.status != WorkerStatus::Unhealthy {
                            info.status = WorkerStatus::Unhealthy;
                            flipped = true;
                        }
                    });
                    if flipped {
                        tracing::warn!(
                            session_id = %session.id(),
                            worker_id = %worker_id,
                            "worker unhealthy"
                        );
                    }
                }
            }
        }
    }

    /// Release one worker's instance. Idempotent.
    pub async fn deprovision(&self, worker_id: &WorkerId) -> bool {
        match self
            .compute
            .delete_service(&self.settings.project, &self.settings.region, worker_id.as_str())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(worker_id = %worker_id, error = %e, "deprovision failed");
                false
            }
        }
    }

    /// Release every instance the session owns. Failures are logged and
    /// do not stop the sweep.
    pub async fn deprovision_fleet(&self, session: &Session) {
        for worker in session.workers_snapshot() {
            self.deprovision(&worker.id).await;
        }
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
