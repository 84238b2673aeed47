// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable progress and report artifacts.
//!
//! Writes under `{reports_dir}`:
//!   `progress_{session_id}.md`                 running journal
//!   `results_{session_id}/worker_{id}.json`    per-worker raw results
//!   `report_{session_id}.md`                   final rendered report
//!
//! Filesystem writes are best-effort: failures are logged via tracing
//! and never abort the campaign. The structured report in the document
//! store is the authoritative artifact.

use crate::session::Session;
use chrono::{TimeZone, Utc};
use dn_core::{Report, SessionId, WorkerResult};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Journal writer rooted at the reports directory.
pub struct ProgressJournal {
    reports_dir: PathBuf,
}

impl ProgressJournal {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self { reports_dir: reports_dir.into() }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn progress_path(&self, session_id: &SessionId) -> PathBuf {
        self.reports_dir.join(format!("progress_{session_id}.md"))
    }

    pub fn report_path(&self, session_id: &SessionId) -> PathBuf {
        self.reports_dir.join(format!("report_{session_id}.md"))
    }

    pub fn results_dir(&self, session_id: &SessionId) -> PathBuf {
        self.reports_dir.join(format!("results_{session_id}"))
    }

    fn worker_result_path(&self, session_id: &SessionId, result: &WorkerResult) -> PathBuf {
        self.results_dir(session_id)
            .join(format!("worker_{}.json", result.worker_id))
    }

    /// Rewrite the running journal snapshot for `session`.
    pub fn write_progress(&self, session: &Session, now_ms: u64) {
        let mut text = String::new();
        let _ = writeln!(text, "# Campaign {}", session.id());
        let _ = writeln!(text);
        let _ = writeln!(text, "- topic: {}", session.config().topic);
        let _ = writeln!(text, "- status: {}", session.status());
        let _ = writeln!(text, "- updated: {}", format_utc(now_ms));
        let _ = writeln!(
            text,
            "- results: {} of {} expected",
            session.result_count(),
            session.worker_count()
        );
        let _ = writeln!(text);
        let _ = writeln!(text, "## Workers");
        let _ = writeln!(text);
        let _ = writeln!(text, "| worker | status | endpoint |");
        let _ = writeln!(text, "|---|---|---|");
        for worker in session.workers_snapshot() {
            let _ = writeln!(
                text,
                "| {} | {} | {} |",
                worker.id,
                worker.status,
                worker.endpoint.as_deref().unwrap_or("-")
            );
        }
        let notes = session.notes_snapshot();
        if !notes.is_empty() {
            let _ = writeln!(text);
            let _ = writeln!(text, "## Notes");
            let _ = writeln!(text);
            for note in notes {
                let _ = writeln!(text, "- {note}");
            }
        }

        self.write_file(&self.progress_path(session.id()), &text, "progress journal");
    }

    /// Persist one worker's raw result under the session's results dir.
    pub fn write_worker_result(&self, session_id: &SessionId, result: &WorkerResult) {
        let path = self.worker_result_path(session_id, result);
        match serde_json::to_string_pretty(result) {
            Ok(json) => self.write_file(&path, &json, "worker result"),
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    worker_id = %result.worker_id,
                    error = %e,
                    "failed to encode worker result"
                );
            }
        }
    }

    /// Render the final human-readable report. Returns the advisory
    /// path when the write succeeded.
    pub fn write_final_report(&self, session: &Session, report: &Report) -> Option<PathBuf> {
        let session_id = session.id();
        let mut text = String::new();
        let _ = writeln!(text, "# {}", report.title);
        let _ = writeln!(text);
        let _ = writeln!(text, "- session: {session_id}");
        let _ = writeln!(text, "- report: {}", report.id);
        let _ = writeln!(text, "- created: {}", format_utc(report.created_at_ms));
        let _ = writeln!(text);
        let _ = writeln!(text, "## Executive summary");
        let _ = writeln!(text);
        let _ = writeln!(text, "{}", report.executive_summary);
        let _ = writeln!(text);
        let _ = writeln!(text, "## Methodology");
        let _ = writeln!(text);
        let _ = writeln!(text, "{}", report.methodology);
        for section in &report.sections {
            let _ = writeln!(text);
            let _ = writeln!(text, "## {}", section.title);
            let _ = writeln!(text);
            let _ = writeln!(text, "{}", section.prose);
            if !section.insights.is_empty() {
                let _ = writeln!(text);
                for insight in &section.insights {
                    let _ = writeln!(text, "- {insight}");
                }
            }
        }
        let _ = writeln!(text);
        let _ = writeln!(text, "## Raw results");
        let _ = writeln!(text);
        for result in session.results_snapshot() {
            let path = self.worker_result_path(session_id, &result);
            let _ = writeln!(text, "- [{}]({})", result.worker_id, path.display());
        }

        let path = self.report_path(session_id);
        if self.try_write_file(&path, &text, "final report") {
            Some(path)
        } else {
            None
        }
    }

    fn write_file(&self, path: &Path, content: &str, what: &str) {
        self.try_write_file(path, content, what);
    }

    fn try_write_file(&self, path: &Path, content: &str, what: &str) -> bool {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %path.display(), error = %e, "failed to create {what} dir");
                return false;
            }
        }
        match fs::write(path, content) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to write {what}");
                false
            }
        }
    }
}

/// `2026-01-30T08:14:09Z` from epoch milliseconds.
fn format_utc(epoch_ms: u64) -> String {
    match Utc.timestamp_millis_opt(epoch_ms as i64) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        _ => format!("epoch_ms:{epoch_ms}"),
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
