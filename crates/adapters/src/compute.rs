// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute service port.
//!
//! The fleet manager provisions one service instance per drone through
//! this trait. `create_service` is the awaitable provisioning
//! operation: it resolves once the instance is addressable and returns
//! its URI.

mod kube;

pub use kube::KubeCompute;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from compute service operations.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("create {0} failed: {1}")]
    CreateFailed(String, String),
    #[error("service not found: {0}")]
    NotFound(String),
    #[error("service {0} never became ready")]
    NeverReady(String),
    #[error("delete {0} failed: {1}")]
    DeleteFailed(String, String),
}

/// Resource sizing and environment for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub image: String,
    pub cpu_millis: u32,
    pub memory_mb: u32,
    pub env: Vec<(String, String)>,
}

/// A provisioned, addressable service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    /// `host:port` the instance answers HTTP on.
    pub uri: String,
}

/// Port to the elastic compute platform.
#[async_trait]
pub trait ComputeAdapter: Clone + Send + Sync + 'static {
    /// Create an instance and wait until it is addressable.
    ///
    /// Idempotent on `id`: creating a service that already exists
    /// returns the existing instance.
    async fn create_service(
        &self,
        project: &str,
        region: &str,
        id: &str,
        spec: &ServiceSpec,
    ) -> Result<Service, ComputeError>;

    /// Look up an existing instance.
    async fn get_service(
        &self,
        project: &str,
        region: &str,
        id: &str,
    ) -> Result<Service, ComputeError>;

    /// Release an instance. Idempotent: deleting an absent service is Ok.
    async fn delete_service(
        &self,
        project: &str,
        region: &str,
        id: &str,
    ) -> Result<(), ComputeError>;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCompute;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ComputeAdapter, ComputeError, Service, ServiceSpec};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    struct FakeComputeState {
        /// Pre-registered endpoints, keyed by service id.
        endpoints: HashMap<String, String>,
        /// Service ids whose create_service must fail.
        failing: HashSet<String>,
        /// Fail every create_service regardless of id.
        fail_all: bool,
        /// Currently live services (create minus delete).
        live: HashMap<String, Service>,
        /// Every create/delete call, in order, for assertions.
        created: Vec<String>,
        deleted: Vec<String>,
    }

    /// Fake compute platform for tests.
    ///
    /// Endpoints are pre-registered per service id; unregistered ids
    /// resolve to a synthetic `{id}.invalid:0` address. Leak accounting
    /// (`live_count`) lets specs assert that cleanup released every
    /// instance.
    #[derive(Clone)]
    pub struct FakeCompute {
        inner: Arc<Mutex<FakeComputeState>>,
    }

    impl Default for FakeCompute {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeCompute {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeComputeState {
                    endpoints: HashMap::new(),
                    failing: HashSet::new(),
                    fail_all: false,
                    live: HashMap::new(),
                    created: Vec::new(),
                    deleted: Vec::new(),
                })),
            }
        }

        /// Register the endpoint returned for `service_id`.
        pub fn register_endpoint(&self, service_id: &str, endpoint: &str) {
            self.inner
                .lock()
                .endpoints
                .insert(service_id.to_string(), endpoint.to_string());
        }

        /// Make `create_service` fail for `service_id`.
        pub fn fail_service(&self, service_id: &str) {
            self.inner.lock().failing.insert(service_id.to_string());
        }

        /// Make every `create_service` call fail.
        pub fn fail_all(&self) {
            self.inner.lock().fail_all = true;
        }

        /// Instances created and not yet deleted.
        pub fn live_count(&self) -> usize {
            self.inner.lock().live.len()
        }

        pub fn created_ids(&self) -> Vec<String> {
            self.inner.lock().created.clone()
        }

        pub fn deleted_ids(&self) -> Vec<String> {
            self.inner.lock().deleted.clone()
        }
    }

    #[async_trait]
    impl ComputeAdapter for FakeCompute {
        async fn create_service(
            &self,
            _project: &str,
            _region: &str,
            id: &str,
            _spec: &ServiceSpec,
        ) -> Result<Service, ComputeError> {
            let mut state = self.inner.lock();
            state.created.push(id.to_string());
            if state.fail_all || state.failing.contains(id) {
                return Err(ComputeError::CreateFailed(
                    id.to_string(),
                    "scripted failure".to_string(),
                ));
            }
            if let Some(existing) = state.live.get(id) {
                return Ok(existing.clone());
            }
            let uri = state
                .endpoints
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("{id}.invalid:0"));
            let service = Service { id: id.to_string(), uri };
            state.live.insert(id.to_string(), service.clone());
            Ok(service)
        }

        async fn get_service(
            &self,
            _project: &str,
            _region: &str,
            id: &str,
        ) -> Result<Service, ComputeError> {
            self.inner
                .lock()
                .live
                .get(id)
                .cloned()
                .ok_or_else(|| ComputeError::NotFound(id.to_string()))
        }

        async fn delete_service(
            &self,
            _project: &str,
            _region: &str,
            id: &str,
        ) -> Result<(), ComputeError> {
            let mut state = self.inner.lock();
            state.deleted.push(id.to_string());
            state.live.remove(id);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod tests;
