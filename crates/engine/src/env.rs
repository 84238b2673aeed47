// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors resolving required environment configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("DN_PROJECT is not set")]
    MissingProject,
    #[error("DN_BASE_URL is not set")]
    MissingBaseUrl,
}

/// Cloud project identifier (required).
pub fn project() -> Result<String, EnvError> {
    std::env::var("DN_PROJECT")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(EnvError::MissingProject)
}

/// Deployment region (default `us-central1`).
pub fn region() -> String {
    std::env::var("DN_REGION").unwrap_or_else(|_| "us-central1".to_string())
}

/// Orchestrator base URL, injected into drones so they can reach back
/// (required).
pub fn base_url() -> Result<String, EnvError> {
    std::env::var("DN_BASE_URL")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(EnvError::MissingBaseUrl)
}

/// Root directory for journal artifacts (default `reports`).
pub fn reports_dir() -> PathBuf {
    std::env::var("DN_REPORTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reports"))
}

/// Container image for drone instances.
pub fn drone_image() -> String {
    std::env::var("DN_DRONE_IMAGE").unwrap_or_else(|_| "dragnet-drone:latest".to_string())
}

/// Per-instance cost rate in micro-dollars per minute.
pub fn rate_micros_per_min() -> u64 {
    std::env::var("DN_RATE_MICROS_PER_MIN")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000)
}

/// Instruction dispatch timeout (default 10s).
pub fn dispatch_timeout() -> Duration {
    duration_ms("DN_DISPATCH_TIMEOUT_MS", Duration::from_secs(10))
}

/// Liveness probe timeout (default 5s).
pub fn probe_timeout() -> Duration {
    duration_ms("DN_PROBE_TIMEOUT_MS", Duration::from_secs(5))
}

/// Liveness probe cadence (default 10s).
pub fn health_interval() -> Duration {
    duration_ms("DN_HEALTH_INTERVAL_MS", Duration::from_secs(10))
}

/// Wait-for-completion ticker (default 5s).
pub fn completion_tick() -> Duration {
    duration_ms("DN_TICK_MS", Duration::from_secs(5))
}

fn duration_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// Resolved engine configuration, passed to the coordinator and fleet.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project: String,
    pub region: String,
    pub base_url: String,
    pub reports_dir: PathBuf,
    pub drone_image: String,
    pub rate_micros_per_min: u64,
    pub dispatch_timeout: Duration,
    pub probe_timeout: Duration,
    pub health_interval: Duration,
    pub completion_tick: Duration,
}

impl Settings {
    /// Resolve everything from the environment.
    pub fn from_env() -> Result<Self, EnvError> {
        Ok(Self {
            project: project()?,
            region: region(),
            base_url: base_url()?,
            reports_dir: reports_dir(),
            drone_image: drone_image(),
            rate_micros_per_min: rate_micros_per_min(),
            dispatch_timeout: dispatch_timeout(),
            probe_timeout: probe_timeout(),
            health_interval: health_interval(),
            completion_tick: completion_tick(),
        })
    }

    /// Fast cadences and a scratch reports dir for tests.
    #[cfg(any(test, feature = "test-support"))]
    pub fn for_tests(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            project: "test-project".to_string(),
            region: "us-central1".to_string(),
            base_url: "127.0.0.1:0".to_string(),
            reports_dir: reports_dir.into(),
            drone_image: "dragnet-drone:test".to_string(),
            rate_micros_per_min: 1_000,
            dispatch_timeout: Duration::from_millis(500),
            probe_timeout: Duration::from_millis(200),
            health_interval: Duration::from_millis(50),
            completion_tick: Duration::from_millis(10),
        }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
