// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub bus port.
//!
//! Workers publish results to a per-campaign topic; the result queue
//! consumes them through a subscription. Delivery is at-least-once and,
//! with ordering enabled, in publish order per subscription. A handler
//! returns [`MessageAction::Ack`] to consume a message or
//! [`MessageAction::Nack`] to have it redelivered.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),
    #[error("subscription not found: {0}")]
    SubscriptionNotFound(String),
    #[error("publish to {0} failed: {1}")]
    PublishFailed(String, String),
}

/// One delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

/// Handler verdict for a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// Consume the message.
    Ack,
    /// Redeliver the message later.
    Nack,
}

/// Per-message callback. Delivery blocks on the returned future, so a
/// slow handler applies backpressure to the subscription.
pub type MessageHandler = Arc<dyn Fn(BusMessage) -> BoxFuture<'static, MessageAction> + Send + Sync>;

/// Subscription tuning, mirrored from the bus provider's knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionConfig {
    pub ack_deadline: Duration,
    pub retention: Duration,
    pub expiration: Duration,
    pub ordering: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            ack_deadline: Duration::from_secs(30),
            retention: Duration::from_secs(24 * 60 * 60),
            expiration: Duration::from_secs(25 * 60 * 60),
            ordering: true,
        }
    }
}

/// Port to the durable message bus.
#[async_trait]
pub trait BusAdapter: Clone + Send + Sync + 'static {
    async fn topic_exists(&self, topic: &str) -> Result<bool, BusError>;

    /// Create a topic. Creating an existing topic is Ok.
    async fn create_topic(&self, topic: &str) -> Result<(), BusError>;

    /// Delete a topic. Deleting an absent topic is Ok.
    async fn delete_topic(&self, topic: &str) -> Result<(), BusError>;

    async fn publish(
        &self,
        topic: &str,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<(), BusError>;

    /// Create a subscription on `topic`. Creating an existing
    /// subscription is Ok.
    async fn create_subscription(
        &self,
        topic: &str,
        subscription: &str,
        config: SubscriptionConfig,
    ) -> Result<(), BusError>;

    /// Delete a subscription. Deleting an absent subscription is Ok.
    async fn delete_subscription(&self, subscription: &str) -> Result<(), BusError>;

    /// Deliver messages to `handler` one at a time until `cancel` fires
    /// or the subscription is deleted. Nacked messages are redelivered
    /// before later ones.
    async fn receive(
        &self,
        subscription: &str,
        cancel: CancellationToken,
        handler: MessageHandler,
    ) -> Result<(), BusError>;
}

/// Delay before redelivering a nacked message.
const REDELIVERY_BACKOFF: Duration = Duration::from_millis(10);

struct SubState {
    topic: String,
    queue: VecDeque<BusMessage>,
    wake: Arc<tokio::sync::Notify>,
}

#[derive(Default)]
struct MemoryBusState {
    topics: Vec<String>,
    subs: HashMap<String, SubState>,
}

/// Process-local bus: at-least-once, in publish order per subscription.
///
/// The shipped concrete for single-process deployments and the
/// workhorse of the specs. A cloud pub/sub adapter slots in behind
/// [`BusAdapter`] without touching the engine.
#[derive(Clone, Default)]
pub struct MemoryBus {
    inner: Arc<Mutex<MemoryBusState>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Topics currently live (for leak assertions in tests).
    pub fn topic_names(&self) -> Vec<String> {
        self.inner.lock().topics.clone()
    }

    /// Subscriptions currently live (for leak assertions in tests).
    pub fn subscription_names(&self) -> Vec<String> {
        self.inner.lock().subs.keys().cloned().collect()
    }

    /// Re-queue a nacked message at the front of its subscription's queue.
    fn requeue(&self, subscription: &str, redeliver: BusMessage) {
        let mut state = self.inner.lock();
        if let Some(sub) = state.subs.get_mut(subscription) {
            sub.queue.push_front(redeliver);
        }
    }
}

#[async_trait]
impl BusAdapter for MemoryBus {
    async fn topic_exists(&self, topic: &str) -> Result<bool, BusError> {
        Ok(self.inner.lock().topics.iter().any(|t| t == topic))
    }

    async fn create_topic(&self, topic: &str) -> Result<(), BusError> {
        let mut state = self.inner.lock();
        if !state.topics.iter().any(|t| t == topic) {
            state.topics.push(topic.to_string());
        }
        Ok(())
    }

    async fn delete_topic(&self, topic: &str) -> Result<(), BusError> {
        self.inner.lock().topics.retain(|t| t != topic);
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<(), BusError> {
        let mut state = self.inner.lock();
        if !state.topics.iter().any(|t| t == topic) {
            return Err(BusError::TopicNotFound(topic.to_string()));
        }
        let message = BusMessage { data, attributes };
        for sub in state.subs.values_mut().filter(|s| s.topic == topic) {
            sub.queue.push_back(message.clone());
            sub.wake.notify_one();
        }
        Ok(())
    }

    async fn create_subscription(
        &self,
        topic: &str,
        subscription: &str,
        _config: SubscriptionConfig,
    ) -> Result<(), BusError> {
        let mut state = self.inner.lock();
        if !state.topics.iter().any(|t| t == topic) {
            return Err(BusError::TopicNotFound(topic.to_string()));
        }
        state
            .subs
            .entry(subscription.to_string())
            .or_insert_with(|| SubState {
                topic: topic.to_string(),
                queue: VecDeque::new(),
                wake: Arc::new(tokio::sync::Notify::new()),
            });
        Ok(())
    }

    async fn delete_subscription(&self, subscription: &str) -> Result<(), BusError> {
        if let Some(sub) = self.inner.lock().subs.remove(subscription) {
            // Unpark a receive loop blocked on this subscription.
            sub.wake.notify_one();
        }
        Ok(())
    }

    async fn receive(
        &self,
        subscription: &str,
        cancel: CancellationToken,
        handler: MessageHandler,
    ) -> Result<(), BusError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            let (message, wake) = {
                let mut state = self.inner.lock();
                let Some(sub) = state.subs.get_mut(subscription) else {
                    // Subscription deleted: delivery is over.
                    return Ok(());
                };
                (sub.queue.pop_front(), Arc::clone(&sub.wake))
            };

            match message {
                Some(message) => {
                    let redeliver = message.clone();
                    match handler(message).await {
                        MessageAction::Ack => {}
                        MessageAction::Nack => {
                            self.requeue(subscription, redeliver);
                            tokio::time::sleep(REDELIVERY_BACKOFF).await;
                        }
                    }
                }
                None => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = wake.notified() => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
