// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations (Telegram, etc.).

use async_trait::async_trait;

use crate::error::RentioError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Intent, MessageId, Notification};

/// Adapter for bidirectional messaging channel integrations.
///
/// Channel adapters connect Rentio to an external messaging platform,
/// translating platform updates into typed [`Intent`]s and delivering
/// [`Notification`]s back out. The core never sees raw transport payloads.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), RentioError>;

    /// Delivers a notification through the channel.
    async fn send(&self, note: Notification) -> Result<MessageId, RentioError>;

    /// Receives the next inbound intent from the channel.
    async fn receive(&self) -> Result<Intent, RentioError>;
}
