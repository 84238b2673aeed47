// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The campaign state machine.
//!
//! [`Coordinator::run`] drives one session from `initializing` to a
//! terminal state: accept, decompose, provision, dispatch, collect,
//! aggregate and report, finalize. Phases execute serially per session;
//! cleanup runs on every exit path. Cancellation is tied to session
//! lifetime and observed at every suspension point.

use crate::analyzer::Analyzer;
use crate::dispatch;
use crate::env::Settings;
use crate::error::CampaignError;
use crate::fleet::FleetManager;
use crate::journal::ProgressJournal;
use crate::queue::{self, ResultQueue};
use crate::registry::SessionRegistry;
use crate::session::{ResultIngest, Session};
use dn_adapters::{BusAdapter, ComputeAdapter, ModelAdapter, StoreAdapter};
use dn_core::{
    CampaignConfig, CampaignStatus, Clock, Metrics, ReportId, ReportMetadata, ResultStatus,
    SessionId, WorkerInfo, WorkerResult, WorkerStatus,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Document-store collection holding structured reports.
const REPORTS_COLLECTION: &str = "reports";

/// Adapter dependencies for a coordinator.
pub struct CoordinatorDeps<P, B, S, M> {
    pub compute: P,
    pub bus: B,
    pub store: S,
    pub model: M,
}

/// What the caller gets back for a campaign.
///
/// Always carries `session_id`, `status`, and `metrics`; the report
/// reference and the advisory filesystem path are absent on `failed`
/// and may be absent on `timeout`.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignOutcome {
    pub session_id: SessionId,
    pub status: CampaignStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<ReportId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    pub metrics: Metrics,
    pub completed_at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates campaigns over the capability ports.
pub struct Coordinator<P, B, S, M, C>
where
    P: ComputeAdapter,
    B: BusAdapter,
    S: StoreAdapter,
    M: ModelAdapter,
    C: Clock,
{
    fleet: FleetManager<P, C>,
    bus: B,
    store: S,
    model: M,
    clock: C,
    registry: SessionRegistry,
    journal: ProgressJournal,
    settings: Settings,
}

impl<P, B, S, M, C> Coordinator<P, B, S, M, C>
where
    P: ComputeAdapter,
    B: BusAdapter,
    S: StoreAdapter,
    M: ModelAdapter,
    C: Clock,
{
    pub fn new(deps: CoordinatorDeps<P, B, S, M>, clock: C, settings: Settings) -> Self {
        let fleet = FleetManager::new(deps.compute, clock.clone(), settings.clone());
        let journal = ProgressJournal::new(settings.reports_dir.clone());
        Self {
            fleet,
            bus: deps.bus,
            store: deps.store,
            model: deps.model,
            clock,
            registry: SessionRegistry::new(),
            journal,
            settings,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Status of an active campaign.
    pub fn status(&self, session_id: &SessionId) -> Option<CampaignStatus> {
        self.registry.status(session_id)
    }

    /// Run one campaign end to end.
    ///
    /// `Err` is returned only when no session was created (invalid or
    /// duplicate config). Every later failure comes back as an
    /// [`CampaignOutcome`] with a terminal status and the error kind in
    /// `outcome.error`.
    pub async fn run(&self, config: CampaignConfig) -> Result<CampaignOutcome, CampaignError> {
        config.validate()?;
        let config = Arc::new(config);
        let session = Arc::new(Session::new(Arc::clone(&config), self.clock.now()));
        if !self.registry.insert(Arc::clone(&session)) {
            return Err(CampaignError::DuplicateSession(config.session_id.to_string()));
        }

        tracing::info!(
            session_id = %config.session_id,
            topic = %config.topic,
            workers = config.worker_count,
            depth = %config.depth,
            "campaign accepted"
        );
        self.journal.write_progress(&session, self.clock.epoch_ms());

        let cancel = CancellationToken::new();
        let drive_result = self.drive(&session, &cancel).await;

        // Cleanup runs on every exit path.
        cancel.cancel();
        self.cleanup(&session).await;
        self.registry.remove(session.id());

        let (report_path, error) = match drive_result {
            Ok(path) => (path, None),
            Err(e) => {
                tracing::warn!(
                    session_id = %config.session_id,
                    kind = e.kind(),
                    error = %e,
                    "campaign failed"
                );
                if !session.status().is_terminal() {
                    // Accept/decompose/provision/report failures land here.
                    let _ = session.transition(CampaignStatus::Failed);
                }
                (None, Some(format!("{}: {e}", e.kind())))
            }
        };
        self.journal.write_progress(&session, self.clock.epoch_ms());

        let metrics = self.session_metrics(&session);
        // A failed campaign carries no report reference, even if a draft
        // was generated before the fatal step.
        let report_id = match error {
            None => session.report().map(|r| r.id),
            Some(_) => None,
        };
        Ok(CampaignOutcome {
            session_id: config.session_id.clone(),
            status: session.status(),
            report_id,
            report_path,
            metrics,
            completed_at_ms: self.clock.epoch_ms(),
            error,
        })
    }

    /// The phase driver: everything between accept and cleanup.
    async fn drive(
        &self,
        session: &Arc<Session>,
        cancel: &CancellationToken,
    ) -> Result<Option<PathBuf>, CampaignError> {
        let config = Arc::clone(session.config());

        // Decompose.
        let requested = config.worker_count;
        let mut sub_queries = self
            .model
            .sub_queries(&config.topic, requested)
            .await
            .map_err(|e| {
                CampaignError::ProvisioningExhausted(format!("sub-query generation failed: {e}"))
            })?;
        sub_queries.truncate(requested as usize);
        if sub_queries.is_empty() {
            return Err(CampaignError::ProvisioningExhausted(
                "adapter produced no sub-queries".to_string(),
            ));
        }
        let effective = sub_queries.len() as u32;
        if effective < requested {
            tracing::info!(
                session_id = %config.session_id,
                requested,
                effective,
                "sub-query shortfall reduces the fleet"
            );
            session.add_note(format!(
                "requested {requested} workers, adapter produced {effective} sub-queries; \
                 fleet reduced to {effective}"
            ));
        }

        // Provision.
        self.advance(session, CampaignStatus::Provisioning)?;
        let outcomes = self.fleet.provision_fleet(effective, &config, cancel).await;
        let now_ms = self.clock.epoch_ms();
        for outcome in &outcomes {
            match &outcome.endpoint {
                Ok(endpoint) => {
                    let mut info = WorkerInfo::pending(outcome.worker_id.clone());
                    info.mark_deployed(endpoint.clone(), now_ms);
                    session.add_worker(info);
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %config.session_id,
                        worker_id = %outcome.worker_id,
                        error = %e,
                        "provisioning attempt failed"
                    );
                    session.add_note(format!("{} failed to provision: {e}", outcome.worker_id));
                }
            }
        }
        let provisioned = session.worker_count() as u32;
        if provisioned == 0 {
            return Err(CampaignError::ProvisioningExhausted(format!(
                "0 of {effective} workers provisioned"
            )));
        }
        if provisioned < effective {
            session.add_note(format!(
                "partial fleet: {provisioned} of {effective} workers provisioned"
            ));
        }

        // Dispatch. The subscription opens first so no result can beat it.
        self.advance(session, CampaignStatus::Running)?;
        let mut results = ResultQueue::open(self.bus.clone(), session.id(), cancel)
            .await
            .map_err(|e| CampaignError::Internal(format!("result queue: {e}")))?;

        let watch = tokio::spawn({
            let fleet = self.fleet.clone();
            let session = Arc::clone(session);
            let cancel = cancel.child_token();
            async move { fleet.watch(session, cancel).await }
        });

        let collected = async {
            self.dispatch_fleet(session, &sub_queries, &outcomes, cancel).await?;
            self.journal.write_progress(session, self.clock.epoch_ms());
            // Collect until quorum or timeout.
            self.collect(session, &mut results, cancel).await
        }
        .await;
        results.close().await;
        watch.abort();
        let timed_out = collected?;

        if timed_out {
            self.advance(session, CampaignStatus::Timeout)?;
            session.add_note("campaign timed out; reporting on collected results".to_string());
            tracing::warn!(
                session_id = %config.session_id,
                collected = session.result_count(),
                expected = provisioned,
                "campaign timed out"
            );
        }

        // Aggregate and report.
        let report_path = self.report(session).await?;

        // Finalize.
        if !session.status().is_terminal() {
            self.advance(session, CampaignStatus::Completed)?;
        }
        tracing::info!(
            session_id = %config.session_id,
            status = %session.status(),
            results = session.result_count(),
            "campaign finished"
        );
        Ok(report_path)
    }

    /// Positional dispatch: sub-query `i` goes to the worker provisioned
    /// for slot `i`. A dispatch failure is terminal for that worker but
    /// never aborts the others.
    async fn dispatch_fleet(
        &self,
        session: &Arc<Session>,
        sub_queries: &[String],
        outcomes: &[crate::fleet::ProvisionOutcome],
        cancel: &CancellationToken,
    ) -> Result<(), CampaignError> {
        let config = session.config();
        for (index, outcome) in outcomes.iter().enumerate() {
            let Ok(endpoint) = &outcome.endpoint else {
                continue;
            };
            let Some(sub_query) = sub_queries.get(index) else {
                continue;
            };
            if cancel.is_cancelled() {
                return Err(CampaignError::Cancelled);
            }

            let sent = match self.model.instructions(config, sub_query).await {
                Ok(instructions) => {
                    let send = dispatch::send_instructions(
                        endpoint,
                        &instructions,
                        self.clock.epoch_ms(),
                        self.settings.dispatch_timeout,
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(CampaignError::Cancelled),
                        result = send => result.map_err(|e| e.to_string()),
                    }
                }
                Err(e) => Err(e.to_string()),
            };

            match sent {
                Ok(()) => {
                    session.set_worker_status(&outcome.worker_id, WorkerStatus::Running);
                    tracing::debug!(
                        session_id = %config.session_id,
                        worker_id = %outcome.worker_id,
                        sub_query = %sub_query,
                        "instructions dispatched"
                    );
                }
                Err(message) => {
                    tracing::warn!(
                        session_id = %config.session_id,
                        worker_id = %outcome.worker_id,
                        error = %message,
                        "dispatch failed"
                    );
                    session.add_note(format!(
                        "{} failed to receive instructions: {message}",
                        outcome.worker_id
                    ));
                    // Terminal for this worker: record a synthesized
                    // failure so completion accounting stays closed.
                    session.record_result(WorkerResult {
                        worker_id: outcome.worker_id.clone(),
                        status: ResultStatus::Failed,
                        data: serde_json::Value::Null,
                        error_message: Some(format!("dispatch failed: {message}")),
                        completed_at_ms: self.clock.epoch_ms(),
                        processing_time_ms: 0,
                    });
                }
            }
        }
        Ok(())
    }

    /// Wait for quorum (all provisioned workers reported) or timeout.
    /// Returns true when the session timed out.
    async fn collect(
        &self,
        session: &Arc<Session>,
        results: &mut ResultQueue<B>,
        cancel: &CancellationToken,
    ) -> Result<bool, CampaignError> {
        let budget = session.config().timeout();
        let mut ticker = tokio::time::interval(self.settings.completion_tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            if session.is_complete() {
                return Ok(false);
            }
            if session.elapsed(self.clock.now()) >= budget {
                return Ok(true);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(CampaignError::Cancelled),
                maybe = results.next_result() => {
                    if let Some(result) = maybe {
                        self.ingest(session, result);
                    }
                }
                _ = ticker.tick() => {}
            }

            while let Some(diagnostic) = results.try_error() {
                tracing::warn!(session_id = %session.id(), "{diagnostic}");
            }
        }
    }

    fn ingest(&self, session: &Arc<Session>, result: WorkerResult) {
        let worker_id = result.worker_id.clone();
        match session.record_result(result) {
            ResultIngest::Recorded => {
                tracing::info!(
                    session_id = %session.id(),
                    worker_id = %worker_id,
                    collected = session.result_count(),
                    expected = session.worker_count(),
                    "result collected"
                );
                self.journal.write_progress(session, self.clock.epoch_ms());
            }
            ResultIngest::DuplicateWorker => {
                tracing::debug!(
                    session_id = %session.id(),
                    worker_id = %worker_id,
                    "duplicate result ignored"
                );
            }
            ResultIngest::UnknownWorker => {
                tracing::warn!(
                    session_id = %session.id(),
                    worker_id = %worker_id,
                    "result for unknown worker discarded"
                );
            }
            ResultIngest::SessionClosed => {
                tracing::debug!(
                    session_id = %session.id(),
                    worker_id = %worker_id,
                    "result after terminal status dropped"
                );
            }
        }
    }

    /// Persist raw artifacts, analyze, generate and persist the report.
    async fn report(&self, session: &Arc<Session>) -> Result<Option<PathBuf>, CampaignError> {
        let config = session.config();
        let collected = session.results_snapshot();
        for result in &collected {
            self.journal.write_worker_result(session.id(), result);
        }

        let analysis = Analyzer::analyze(&collected);
        let draft = self
            .model
            .report(config, &collected, &analysis)
            .await
            .map_err(|e| CampaignError::ReportGeneration(e.to_string()))?;

        let metrics = self.session_metrics(session);
        let metadata = ReportMetadata {
            sources: collect_sources(&collected),
            result_count: collected.len() as u32,
            duration_ms: metrics.total_duration_ms,
            metrics,
        };
        let report = draft.into_report(
            ReportId::new(),
            session.id().clone(),
            metadata,
            self.clock.epoch_ms(),
        );
        session.set_report(report.clone());

        // Filesystem rendering is advisory; the store write is required.
        let report_path = self.journal.write_final_report(session, &report);
        let doc = serde_json::to_value(&report)
            .map_err(|e| CampaignError::StoreWrite(e.to_string()))?;
        self.store
            .put(REPORTS_COLLECTION, report.id.as_str(), &doc)
            .await
            .map_err(|e| CampaignError::StoreWrite(e.to_string()))?;
        tracing::info!(
            session_id = %session.id(),
            report_id = %report.id,
            "report persisted"
        );
        Ok(report_path)
    }

    fn session_metrics(&self, session: &Session) -> Metrics {
        let (completed, failed) = session.result_tally();
        let provisioned = session.worker_count() as u32;
        let duration_ms = session.elapsed(self.clock.now()).as_millis() as u64;
        Metrics {
            workers_provisioned: provisioned,
            workers_completed: completed,
            workers_failed: failed,
            total_duration_ms: duration_ms,
            data_points: session
                .results_snapshot()
                .iter()
                .map(|r| r.data_points())
                .sum(),
            cost_estimate_micros: Metrics::cost_estimate(
                provisioned,
                duration_ms,
                self.settings.rate_micros_per_min,
            ),
        }
    }

    fn advance(&self, session: &Arc<Session>, to: CampaignStatus) -> Result<(), CampaignError> {
        session
            .transition(to)
            .map_err(|e| CampaignError::Internal(e.to_string()))?;
        self.journal.write_progress(session, self.clock.epoch_ms());
        Ok(())
    }

    /// Release every campaign resource. Failures are logged, never
    /// surfaced to the caller.
    async fn cleanup(&self, session: &Arc<Session>) {
        self.fleet.deprovision_fleet(session).await;

        let subscription = queue::subscription_name(session.id());
        if let Err(e) = self.bus.delete_subscription(&subscription).await {
            tracing::warn!(session_id = %session.id(), error = %e, "subscription cleanup failed");
        }
        let topic = queue::topic_name(session.id());
        if let Err(e) = self.bus.delete_topic(&topic).await {
            tracing::warn!(session_id = %session.id(), error = %e, "topic cleanup failed");
        }
        tracing::debug!(session_id = %session.id(), "cleanup complete");
    }
}

/// Distinct `sources` strings across result payloads, sorted.
fn collect_sources(results: &[WorkerResult]) -> Vec<String> {
    let mut sources = BTreeSet::new();
    for result in results {
        if let Some(items) = result.data.get("sources").and_then(|v| v.as_array()) {
            for item in items {
                if let Some(s) = item.as_str() {
                    sources.insert(s.to_string());
                }
            }
        }
    }
    sources.into_iter().collect()
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
