// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes compute adapter — runs drones in pods.
//!
//! Each drone runs in a pod listening on `DN_WORKER_PORT`. The adapter
//! creates pods via the Kubernetes API and reports `{pod_ip}:{port}` as
//! the service URI once the pod is running. `project` and `region`
//! become pod labels; placement is the cluster's concern.

use super::{ComputeAdapter, ComputeError, Service, ServiceSpec};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use std::time::Duration;

/// How long a created pod may take to reach a routable IP.
const READY_TIMEOUT: Duration = Duration::from_secs(120);
/// Poll cadence while waiting for a pod IP.
const READY_POLL: Duration = Duration::from_secs(2);

/// Compute adapter backed by Kubernetes pods.
#[derive(Clone)]
pub struct KubeCompute {
    client: Client,
}

impl KubeCompute {
    pub async fn new() -> Result<Self, ComputeError> {
        let client = Client::try_default().await.map_err(|e| {
            ComputeError::CreateFailed("client".to_string(), format!("kube client: {e}"))
        })?;
        Ok(Self { client })
    }

    /// Kubernetes namespace for drone pods.
    fn k8s_namespace() -> String {
        std::env::var("DN_K8S_NAMESPACE").unwrap_or_else(|_| "default".to_string())
    }

    /// Container port drones listen on.
    fn worker_port() -> i32 {
        std::env::var("DN_WORKER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080)
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &Self::k8s_namespace())
    }

    /// Wait until the pod has an IP, then build the service URI.
    async fn await_ready(&self, id: &str) -> Result<Service, ComputeError> {
        let pods = self.pods();
        let port = Self::worker_port();
        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;

        loop {
            match pods.get(id).await {
                Ok(pod) => {
                    if let Some(ip) = pod.status.as_ref().and_then(|s| s.pod_ip.as_ref()) {
                        return Ok(Service {
                            id: id.to_string(),
                            uri: format!("{ip}:{port}"),
                        });
                    }
                }
                Err(e) => {
                    tracing::debug!(service = id, error = %e, "pod lookup while waiting for IP");
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ComputeError::NeverReady(id.to_string()));
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }
}

/// Build the pod manifest for one drone.
///
/// Typed k8s structs are verbose; deserializing a manifest keeps the
/// shape readable. A schema mismatch surfaces as a create error.
pub(super) fn drone_pod(
    project: &str,
    region: &str,
    id: &str,
    spec: &ServiceSpec,
    port: i32,
) -> Result<Pod, serde_json::Error> {
    let env: Vec<serde_json::Value> = spec
        .env
        .iter()
        .map(|(name, value)| serde_json::json!({"name": name, "value": value}))
        .collect();
    let cpu = format!("{}m", spec.cpu_millis);
    let memory = format!("{}Mi", spec.memory_mb);

    serde_json::from_value(serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": id,
            "labels": {
                "app": "dragnet-drone",
                "dragnet/project": project,
                "dragnet/region": region,
            },
        },
        "spec": {
            "restartPolicy": "Never",
            "containers": [{
                "name": "drone",
                "image": spec.image,
                "ports": [{"containerPort": port}],
                "env": env,
                "resources": {
                    "requests": {"cpu": cpu, "memory": memory},
                    "limits": {"cpu": cpu, "memory": memory},
                },
            }],
        },
    }))
}

#[async_trait]
impl ComputeAdapter for KubeCompute {
    async fn create_service(
        &self,
        project: &str,
        region: &str,
        id: &str,
        spec: &ServiceSpec,
    ) -> Result<Service, ComputeError> {
        let pods = self.pods();
        let pod = drone_pod(project, region, id, spec, Self::worker_port())
            .map_err(|e| ComputeError::CreateFailed(id.to_string(), e.to_string()))?;

        match pods.create(&PostParams::default(), &pod).await {
            Ok(_) => {}
            // Re-creating an existing pod keeps create_service idempotent.
            Err(kube::Error::Api(ae)) if ae.code == 409 => {
                tracing::debug!(service = id, "pod already exists, awaiting readiness");
            }
            Err(e) => {
                return Err(ComputeError::CreateFailed(id.to_string(), e.to_string()));
            }
        }

        self.await_ready(id).await
    }

    async fn get_service(
        &self,
        _project: &str,
        _region: &str,
        id: &str,
    ) -> Result<Service, ComputeError> {
        let pod = self
            .pods()
            .get(id)
            .await
            .map_err(|_| ComputeError::NotFound(id.to_string()))?;
        let ip = pod
            .status
            .as_ref()
            .and_then(|s| s.pod_ip.as_ref())
            .ok_or_else(|| ComputeError::NotFound(id.to_string()))?;
        Ok(Service {
            id: id.to_string(),
            uri: format!("{ip}:{}", Self::worker_port()),
        })
    }

    async fn delete_service(
        &self,
        _project: &str,
        _region: &str,
        id: &str,
    ) -> Result<(), ComputeError> {
        match self.pods().delete(id, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(()),
            Err(e) => Err(ComputeError::DeleteFailed(id.to_string(), e.to_string())),
        }
    }
}
