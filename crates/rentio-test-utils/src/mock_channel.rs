// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound intents
//! and captured outbound notifications for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use rentio_core::traits::adapter::PluginAdapter;
use rentio_core::traits::channel::ChannelAdapter;
use rentio_core::types::{AdapterType, HealthStatus, Intent, MessageId, Notification};
use rentio_core::RentioError;

/// A mock messaging channel for testing.
///
/// Provides two queues:
/// - **inbound**: Intents injected via `inject_intent()` are returned by `receive()`
/// - **sent**: Notifications passed to `send()` are captured and retrievable
///   via `sent_notifications()`
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<Intent>>>,
    sent: Arc<Mutex<Vec<Notification>>>,
    notify: Arc<Notify>,
    failures_left: Arc<Mutex<usize>>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            failures_left: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `count` calls to `send()` fail with a channel error.
    pub async fn fail_next_sends(&self, count: usize) {
        *self.failures_left.lock().await = count;
    }

    /// Inject an inbound intent into the receive queue.
    ///
    /// The next call to `receive()` will return this intent.
    pub async fn inject_intent(&self, intent: Intent) {
        self.inbound.lock().await.push_back(intent);
        self.notify.notify_one();
    }

    /// Get all notifications that were sent through `send()`.
    pub async fn sent_notifications(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent notifications.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all sent notifications.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RentioError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RentioError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), RentioError> {
        Ok(())
    }

    async fn send(&self, note: Notification) -> Result<MessageId, RentioError> {
        {
            let mut failures = self.failures_left.lock().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(RentioError::Channel {
                    message: "injected send failure".to_string(),
                    source: None,
                });
            }
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(note);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<Intent, RentioError> {
        loop {
            // Try to pop from queue
            {
                let mut queue = self.inbound.lock().await;
                if let Some(intent) = queue.pop_front() {
                    return Ok(intent);
                }
            }
            // Wait for notification that a new intent was injected
            self.notify.notified().await;
        }
    }
}
