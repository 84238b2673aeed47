// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dn-engine: The Dragnet campaign coordinator.
//!
//! One [`Coordinator::run`] call drives a campaign end to end:
//! decompose the topic into sub-queries, provision a drone fleet,
//! dispatch instructions, collect results from the per-campaign bus
//! topic, analyze, report, and clean up. Everything concrete is reached
//! through the `dn-adapters` ports.

pub mod analyzer;
pub mod coordinator;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod fleet;
pub mod journal;
pub mod queue;
pub mod registry;
pub mod session;

pub use analyzer::Analyzer;
pub use coordinator::{CampaignOutcome, Coordinator, CoordinatorDeps};
pub use env::Settings;
pub use error::CampaignError;
pub use fleet::{FleetManager, ResourceTier};
pub use journal::ProgressJournal;
pub use queue::ResultQueue;
pub use registry::SessionRegistry;
pub use session::{ResultIngest, Session};
