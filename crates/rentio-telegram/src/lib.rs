// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Rentio tenancy bot.
//!
//! Implements [`ChannelAdapter`] over the Telegram Bot API via teloxide:
//! long polling for inbound messages and button presses, plain-text
//! delivery with inline keyboards for choices, and photo delivery by
//! file id for stored proof images.

pub mod handler;
pub mod keyboard;

use async_trait::async_trait;
use rentio_config::model::TelegramConfig;
use rentio_core::error::RentioError;
use rentio_core::traits::adapter::PluginAdapter;
use rentio_core::traits::channel::ChannelAdapter;
use rentio_core::types::{AdapterType, Contact, HealthStatus, Intent, MessageId, Notification};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects via long polling and forwards private-chat messages and
/// callback queries as typed intents. Notifications targeting a
/// [`Contact::Handle`] cannot be delivered; Telegram only addresses
/// numeric chat ids, so those fail with a channel error until the
/// occupant messages the bot and their handle is bound.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<Intent>>,
    inbound_tx: mpsc::Sender<Intent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, RentioError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RentioError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(RentioError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RentioError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RentioError> {
        debug!("Telegram channel shutting down");
        // The polling handle will be dropped when TelegramChannel is dropped,
        // which aborts the task. For graceful shutdown, the serve loop should
        // stop calling receive() first.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), RentioError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let msg_tx = self.inbound_tx.clone();
        let cb_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let message_branch = Update::filter_message().endpoint(move |msg: Message| {
                let tx = msg_tx.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    if let Some(intent) = handler::intent_from_message(&msg)
                        && tx.send(intent).await.is_err()
                    {
                        warn!("inbound channel closed, dropping message");
                    }
                    respond(())
                }
            });

            let callback_branch =
                Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                    let tx = cb_tx.clone();
                    async move {
                        // Ack the press so the client stops its spinner.
                        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                            debug!(error = %e, "failed to answer callback query");
                        }
                        if let Some(intent) = handler::intent_from_callback(&query)
                            && tx.send(intent).await.is_err()
                        {
                            warn!("inbound channel closed, dropping button press");
                        }
                        respond(())
                    }
                });

            Dispatcher::builder(
                bot,
                dptree::entry()
                    .branch(message_branch)
                    .branch(callback_branch),
            )
            .default_handler(|_| async {}) // Silently ignore other update kinds
            .build()
            .dispatch()
            .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, note: Notification) -> Result<MessageId, RentioError> {
        let chat_id = match &note.target {
            Contact::UserId(id) => ChatId(*id),
            Contact::Handle(h) => {
                return Err(RentioError::Channel {
                    message: format!(
                        "cannot deliver to @{h}: handle not yet bound to a chat id"
                    ),
                    source: None,
                });
            }
        };

        let markup = keyboard::markup_for(&note.choices);

        let sent = if let Some(image_ref) = &note.image_ref {
            let photo = InputFile::file_id(FileId(image_ref.clone()));
            let mut req = self
                .bot
                .send_photo(Recipient::Id(chat_id), photo)
                .caption(&note.text);
            if let Some(markup) = markup {
                req = req.reply_markup(markup);
            }
            req.await.map_err(|e| RentioError::Channel {
                message: format!("failed to send photo: {e}"),
                source: Some(Box::new(e)),
            })?
        } else {
            let mut req = self.bot.send_message(Recipient::Id(chat_id), &note.text);
            if let Some(markup) = markup {
                req = req.reply_markup(markup);
            }
            req.await.map_err(|e| RentioError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?
        };

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<Intent, RentioError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| RentioError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(TelegramChannel::new(config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(TelegramChannel::new(config).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        assert!(TelegramChannel::new(config).is_ok());
    }

    #[tokio::test]
    async fn send_to_handle_target_fails() {
        let config = TelegramConfig {
            bot_token: Some("test:token".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        let note = Notification::text(Contact::Handle("ali".into()), "hello");
        let err = channel.send(note).await.unwrap_err();
        assert!(matches!(err, RentioError::Channel { .. }));
        assert!(err.to_string().contains("@ali"));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let config = TelegramConfig {
            bot_token: Some("test:token".into()),
        };
        let channel = TelegramChannel::new(config).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
