// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dn-adapters: Capability ports for the Dragnet engine.
//!
//! The engine depends only on the traits defined here; everything
//! concrete (Kubernetes pods, the process-local bus, the filesystem
//! document store) lives behind them and is swapped for fakes in tests.

pub mod bus;
pub mod compute;
pub mod http;
pub mod model;
pub mod store;

pub use bus::{BusAdapter, BusError, BusMessage, MemoryBus, MessageAction, SubscriptionConfig};
#[cfg(any(test, feature = "test-support"))]
pub use compute::FakeCompute;
pub use compute::{ComputeAdapter, ComputeError, KubeCompute, Service, ServiceSpec};
pub use http::{HttpError, HttpResponse};
#[cfg(any(test, feature = "test-support"))]
pub use model::FakeModel;
pub use model::{Instructions, ModelAdapter, ModelError, OutlineModel};
#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;
pub use store::{FsStore, StoreAdapter, StoreError};
