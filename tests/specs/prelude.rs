// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for campaign specs.

use dn_adapters::{BusAdapter as _, FakeCompute, FakeModel, MemoryBus, MemoryStore};
use dn_core::{CampaignConfig, FakeClock, SessionId};
use dn_engine::{Coordinator, CoordinatorDeps, Settings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpListener;

pub use dn_core::CampaignStatus;

/// Max time a spec waits for an asynchronous condition.
pub const SPEC_WAIT_MAX: Duration = Duration::from_secs(5);

pub type SpecCoordinator = Coordinator<FakeCompute, MemoryBus, MemoryStore, FakeModel, FakeClock>;

/// One spec's fleet-in-a-process.
pub struct Harness {
    pub coordinator: Arc<SpecCoordinator>,
    pub compute: FakeCompute,
    pub bus: MemoryBus,
    pub store: MemoryStore,
    pub model: FakeModel,
    pub clock: FakeClock,
    reports: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let reports = tempfile::tempdir().unwrap();
        let compute = FakeCompute::new();
        let bus = MemoryBus::new();
        let store = MemoryStore::new();
        let model = FakeModel::new();
        let clock = FakeClock::new();
        let coordinator = Arc::new(Coordinator::new(
            CoordinatorDeps {
                compute: compute.clone(),
                bus: bus.clone(),
                store: store.clone(),
                model: model.clone(),
            },
            clock.clone(),
            Settings::for_tests(reports.path()),
        ));
        Self { coordinator, compute, bus, store, model, clock, reports }
    }

    pub fn reports_dir(&self) -> &std::path::Path {
        self.reports.path()
    }

    /// Config with a fixed session id so artifacts are addressable.
    pub fn config(&self, session: &str, workers: u32) -> CampaignConfig {
        CampaignConfig::builder()
            .session_id(SessionId::from_string(session))
            .topic("AI safety")
            .worker_count(workers)
            .build()
    }

    /// Spawn a drone for `worker` and register its endpoint with the
    /// fake compute platform.
    pub async fn add_drone(&self, session: &str, worker: &str, script: DroneScript) {
        let topic = format!("results-{session}");
        let addr = spawn_drone(self.bus.clone(), topic, worker.to_string(), script).await;
        self.compute.register_endpoint(worker, &addr);
    }

    /// Read the persisted structured report for `report_id`.
    pub async fn stored_report(&self, report_id: &str) -> Option<serde_json::Value> {
        use dn_adapters::StoreAdapter as _;
        self.store.get("reports", report_id).await.unwrap()
    }

    pub fn progress_text(&self, session: &str) -> String {
        std::fs::read_to_string(self.reports.path().join(format!("progress_{session}.md")))
            .unwrap_or_default()
    }

    pub fn final_report_text(&self, session: &str) -> String {
        std::fs::read_to_string(self.reports.path().join(format!("report_{session}.md")))
            .unwrap_or_default()
    }
}

/// What a drone does after accepting instructions.
#[derive(Clone)]
pub enum DroneScript {
    /// Publish a completed result after the delay.
    Complete(Duration),
    /// Publish the completed result `n` times (duplicate delivery).
    CompleteTimes(u32),
    /// Publish a failed result.
    Fail(&'static str),
    /// Accept instructions but never publish.
    Silent,
}

/// Serve `/health` and `/instructions` for one drone; publish results
/// per the script. Returns the endpoint address.
pub async fn spawn_drone(
    bus: MemoryBus,
    topic: String,
    worker: String,
    script: DroneScript,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let bus = bus.clone();
            let topic = topic.clone();
            let worker = worker.clone();
            let script = script.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 16 * 1024];
                let Ok(n) = socket.read(&mut buf).await else { return };
                let request = String::from_utf8_lossy(&buf[..n]).into_owned();

                if request.starts_with("GET /health") {
                    respond(&mut socket, 200, "ok").await;
                    return;
                }

                // POST /instructions
                respond(&mut socket, 200, "accepted").await;
                drop(socket);
                run_script(bus, &topic, &worker, script).await;
            });
        }
    });

    addr
}

async fn run_script(bus: MemoryBus, topic: &str, worker: &str, script: DroneScript) {
    match script {
        DroneScript::Complete(delay) => {
            tokio::time::sleep(delay).await;
            publish(&bus, topic, &completed_payload(worker)).await;
        }
        DroneScript::CompleteTimes(n) => {
            for _ in 0..n {
                publish(&bus, topic, &completed_payload(worker)).await;
            }
        }
        DroneScript::Fail(message) => {
            publish(
                &bus,
                topic,
                &serde_json::json!({
                    "worker_id": worker,
                    "status": "failed",
                    "data": null,
                    "error_message": message,
                    "completed_at_ms": 1_700_000_060_000u64,
                    "processing_time_ms": 400,
                }),
            )
            .await;
        }
        DroneScript::Silent => {}
    }
}

fn completed_payload(worker: &str) -> serde_json::Value {
    serde_json::json!({
        "worker_id": worker,
        "status": "completed",
        "data": {
            "findings": [format!("finding from {worker}")],
            "sources": [format!("https://example.org/{worker}")],
        },
        "completed_at_ms": 1_700_000_060_000u64,
        "processing_time_ms": 1_100,
    })
}

async fn publish(bus: &MemoryBus, topic: &str, payload: &serde_json::Value) {
    let data = serde_json::to_vec(payload).unwrap();
    let attributes = HashMap::from([("worker".to_string(), "drone".to_string())]);
    // The topic exists while the campaign runs; late publishes after
    // cleanup are dropped on the floor, like any bus would.
    let _ = bus.publish(topic, data, attributes).await;
}

async fn respond(socket: &mut tokio::net::TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
}

/// Route engine tracing through the test writer, once per process.
/// `RUST_LOG=dn_engine=debug` turns the firehose on.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `condition` until it holds or `max` elapses.
pub async fn wait_for(max: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + max;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
