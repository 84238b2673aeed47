// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-campaign session state.
//!
//! A [`Session`] owns the full in-memory state of one campaign behind a
//! reader/writer lock: the ordered worker table, results in arrival
//! order, journal notes, and the status machine. Readers (journal,
//! completion checks) take the lock shared; mutators (ingestion,
//! dispatch, phase transitions) take it exclusive.

use dn_core::{
    CampaignConfig, CampaignStatus, Report, SessionId, WorkerId, WorkerInfo, WorkerResult,
    WorkerStatus,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Attempted illegal status transition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal transition {from} -> {to}")]
pub struct TransitionError {
    pub from: CampaignStatus,
    pub to: CampaignStatus,
}

/// What happened to an ingested result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultIngest {
    /// Appended to the session.
    Recorded,
    /// This worker already has a result; dropped.
    DuplicateWorker,
    /// No such worker in this session; discarded.
    UnknownWorker,
    /// The session is terminal; no further mutation.
    SessionClosed,
}

struct SessionState {
    status: CampaignStatus,
    workers: IndexMap<WorkerId, WorkerInfo>,
    results: Vec<WorkerResult>,
    notes: Vec<String>,
    report: Option<Report>,
}

/// The full in-memory state of one campaign.
pub struct Session {
    config: Arc<CampaignConfig>,
    started_at: Instant,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(config: Arc<CampaignConfig>, started_at: Instant) -> Self {
        Self {
            config,
            started_at,
            state: RwLock::new(SessionState {
                status: CampaignStatus::Initializing,
                workers: IndexMap::new(),
                results: Vec::new(),
                notes: Vec::new(),
                report: None,
            }),
        }
    }

    pub fn config(&self) -> &Arc<CampaignConfig> {
        &self.config
    }

    pub fn id(&self) -> &SessionId {
        &self.config.session_id
    }

    /// Wall-clock elapsed at `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn status(&self) -> CampaignStatus {
        self.state.read().status
    }

    /// Move the state machine forward. Transitions are serialized under
    /// the exclusive lock and must follow the monotonic table.
    pub fn transition(&self, next: CampaignStatus) -> Result<(), TransitionError> {
        let mut state = self.state.write();
        if !state.status.can_transition(next) {
            return Err(TransitionError { from: state.status, to: next });
        }
        tracing::info!(
            session_id = %self.id(),
            from = %state.status,
            to = %next,
            "session transition"
        );
        state.status = next;
        Ok(())
    }

    /// Register a successfully provisioned worker. Returns false if the
    /// ID is already present (the insert is dropped).
    pub fn add_worker(&self, info: WorkerInfo) -> bool {
        let mut state = self.state.write();
        if state.workers.contains_key(&info.id) {
            return false;
        }
        state.workers.insert(info.id.clone(), info);
        true
    }

    /// Update one worker in place; returns false for unknown IDs.
    pub fn with_worker_mut(&self, id: &WorkerId, f: impl FnOnce(&mut WorkerInfo)) -> bool {
        let mut state = self.state.write();
        match state.workers.get_mut(id) {
            Some(info) => {
                f(info);
                true
            }
            None => false,
        }
    }

    pub fn set_worker_status(&self, id: &WorkerId, status: WorkerStatus) -> bool {
        self.with_worker_mut(id, |info| info.status = status)
    }

    /// Append an arriving result and mark its worker terminal.
    pub fn record_result(&self, result: WorkerResult) -> ResultIngest {
        let mut state = self.state.write();
        if state.status.is_terminal() {
            return ResultIngest::SessionClosed;
        }
        if !state.workers.contains_key(&result.worker_id) {
            return ResultIngest::UnknownWorker;
        }
        if state.results.iter().any(|r| r.worker_id == result.worker_id) {
            return ResultIngest::DuplicateWorker;
        }
        let worker_status = match result.status {
            dn_core::ResultStatus::Completed => WorkerStatus::Completed,
            dn_core::ResultStatus::Failed => WorkerStatus::Failed,
        };
        if let Some(info) = state.workers.get_mut(&result.worker_id) {
            info.status = worker_status;
        }
        state.results.push(result);
        ResultIngest::Recorded
    }

    /// Record a human-readable journal note.
    pub fn add_note(&self, note: impl Into<String>) {
        self.state.write().notes.push(note.into());
    }

    /// The report, once generated. Setting it is allowed even on a
    /// terminal session: a timeout still reports on what arrived.
    pub fn set_report(&self, report: Report) {
        self.state.write().report = Some(report);
    }

    pub fn report(&self) -> Option<Report> {
        self.state.read().report.clone()
    }

    /// Number of successfully provisioned workers (the expected result
    /// count).
    pub fn worker_count(&self) -> usize {
        self.state.read().workers.len()
    }

    pub fn result_count(&self) -> usize {
        self.state.read().results.len()
    }

    /// All provisioned workers have reported.
    pub fn is_complete(&self) -> bool {
        let state = self.state.read();
        !state.workers.is_empty() && state.results.len() >= state.workers.len()
    }

    /// `(completed, failed)` result counts.
    pub fn result_tally(&self) -> (u32, u32) {
        let state = self.state.read();
        let completed = state
            .results
            .iter()
            .filter(|r| r.status == dn_core::ResultStatus::Completed)
            .count() as u32;
        (completed, state.results.len() as u32 - completed)
    }

    /// Workers in dispatch order.
    pub fn workers_snapshot(&self) -> Vec<WorkerInfo> {
        self.state.read().workers.values().cloned().collect()
    }

    /// Results in arrival order.
    pub fn results_snapshot(&self) -> Vec<WorkerResult> {
        self.state.read().results.clone()
    }

    pub fn notes_snapshot(&self) -> Vec<String> {
        self.state.read().notes.clone()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
