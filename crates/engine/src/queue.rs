// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-campaign result queue.
//!
//! Subscribes to the campaign's bus topic and turns messages into an
//! in-process stream of [`WorkerResult`]s: decode, dedup by worker id,
//! then enqueue on a bounded channel. A message is acked only after it
//! is safely enqueued; decode failures are nacked (the bus may
//! redeliver); duplicates are acked and dropped. A full results channel
//! blocks the subscriber callback, which applies backpressure to the
//! bus.

use dn_adapters::{BusAdapter, BusError, BusMessage, MessageAction, SubscriptionConfig};
use dn_core::{SessionId, WorkerId, WorkerResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Bounded capacity of the results stream.
const RESULT_CAPACITY: usize = 100;
/// Bounded capacity of the diagnostics stream; lossy when full.
const ERROR_CAPACITY: usize = 10;

/// Per-campaign topic name.
pub fn topic_name(session_id: &SessionId) -> String {
    format!("results-{session_id}")
}

/// Per-campaign subscription name.
pub fn subscription_name(session_id: &SessionId) -> String {
    format!("results-sub-{session_id}")
}

/// The per-campaign subscriber.
pub struct ResultQueue<B: BusAdapter> {
    bus: B,
    subscription: String,
    results_rx: mpsc::Receiver<WorkerResult>,
    errors_rx: mpsc::Receiver<String>,
    cancel: CancellationToken,
    receive_task: tokio::task::JoinHandle<()>,
}

impl<B: BusAdapter> ResultQueue<B> {
    /// Ensure the topic and subscription exist, then start consuming.
    ///
    /// `cancel` is the session token; the queue derives a child token so
    /// closing the queue does not cancel the session.
    pub async fn open(
        bus: B,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<Self, BusError> {
        let topic = topic_name(session_id);
        let subscription = subscription_name(session_id);

        if !bus.topic_exists(&topic).await? {
            bus.create_topic(&topic).await?;
        }
        bus.create_subscription(&topic, &subscription, SubscriptionConfig::default())
            .await?;

        let (results_tx, results_rx) = mpsc::channel(RESULT_CAPACITY);
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_CAPACITY);
        let seen: Arc<Mutex<HashSet<WorkerId>>> = Arc::new(Mutex::new(HashSet::new()));
        let queue_cancel = cancel.child_token();

        let session = session_id.clone();
        let handler: dn_adapters::bus::MessageHandler = Arc::new(move |message: BusMessage| {
            let results_tx = results_tx.clone();
            let errors_tx = errors_tx.clone();
            let seen = Arc::clone(&seen);
            let session = session.clone();
            Box::pin(async move { ingest(message, &session, &seen, &results_tx, &errors_tx).await })
        });

        let receive_task = tokio::spawn({
            let bus = bus.clone();
            let subscription = subscription.clone();
            let cancel = queue_cancel.clone();
            async move {
                if let Err(e) = bus.receive(&subscription, cancel, handler).await {
                    tracing::warn!(subscription, error = %e, "result subscription ended with error");
                }
            }
        });

        tracing::info!(session_id = %session_id, topic, subscription, "result queue open");
        Ok(Self {
            bus,
            subscription,
            results_rx,
            errors_rx,
            cancel: queue_cancel,
            receive_task,
        })
    }

    /// Next decoded result; `None` once the queue is closed and drained.
    pub async fn next_result(&mut self) -> Option<WorkerResult> {
        self.results_rx.recv().await
    }

    /// Drain one pending decode diagnostic, if any.
    pub fn try_error(&mut self) -> Option<String> {
        self.errors_rx.try_recv().ok()
    }

    /// Stop delivery and release the subscription.
    pub async fn close(self) {
        let Self { bus, subscription, results_rx, errors_rx, cancel, receive_task } = self;
        cancel.cancel();
        // Drop the consumers so a handler blocked on a full channel
        // fails its send and the receive loop can observe the cancel.
        drop(results_rx);
        drop(errors_rx);
        if let Err(e) = receive_task.await {
            tracing::warn!(subscription, error = %e, "receive task join failed");
        }
        if let Err(e) = bus.delete_subscription(&subscription).await {
            tracing::warn!(subscription, error = %e, "subscription cleanup failed");
        }
    }
}

/// Decode, dedup, enqueue. The ack decision is the return value.
async fn ingest(
    message: BusMessage,
    session_id: &SessionId,
    seen: &Mutex<HashSet<WorkerId>>,
    results_tx: &mpsc::Sender<WorkerResult>,
    errors_tx: &mpsc::Sender<String>,
) -> MessageAction {
    let result: WorkerResult = match serde_json::from_slice(&message.data) {
        Ok(result) => result,
        Err(e) => {
            let diagnostic = format!("result decode failed: {e}");
            tracing::warn!(session_id = %session_id, error = %e, "result decode failed");
            // Lossy under backpressure: diagnostics are best-effort.
            let _ = errors_tx.try_send(diagnostic);
            return MessageAction::Nack;
        }
    };

    // Best-effort dedup: a seen worker id is acked and dropped here
    // rather than redelivered by the bus.
    {
        let mut seen = seen.lock();
        if !seen.insert(result.worker_id.clone()) {
            tracing::debug!(
                session_id = %session_id,
                worker_id = %result.worker_id,
                "duplicate result dropped"
            );
            return MessageAction::Ack;
        }
    }

    // Enqueue before ack; a full channel blocks the subscriber
    // callback, pushing backpressure to the bus.
    let worker_id = result.worker_id.clone();
    if results_tx.send(result).await.is_err() {
        // Consumer gone: the queue is closing. Un-mark the worker and
        // leave the message for whoever subscribes next.
        seen.lock().remove(&worker_id);
        return MessageAction::Nack;
    }
    MessageAction::Ack
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
