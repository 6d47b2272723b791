// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update-to-intent translation.
//!
//! Converts raw Telegram messages and callback queries into channel-agnostic
//! [`Intent`]s. Group, supergroup, and channel traffic is dropped here; the
//! bot only talks in private chats. Admin authorization happens in the
//! workflow layer, so every private-chat sender gets through.

use rentio_core::types::{ActorRef, Intent};
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::debug;

/// Whether the message arrived in a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Build the actor reference for a message sender.
///
/// Returns `None` for senderless updates such as channel posts.
pub fn actor_of(msg: &Message) -> Option<ActorRef> {
    let user = msg.from.as_ref()?;
    let id = user.id.0 as i64;
    Some(match user.username.as_ref() {
        Some(username) => ActorRef::with_handle(id, username.to_ascii_lowercase()),
        None => ActorRef::new(id),
    })
}

/// Translate a private-chat message into an intent.
///
/// `/start` opens a session, any other text is free-form input, and a photo
/// becomes an image submission carrying the largest variant's file id.
/// Unsupported payloads (stickers, voice, locations) return `None`.
pub fn intent_from_message(msg: &Message) -> Option<Intent> {
    let actor = actor_of(msg)?;

    if let Some(text) = msg.text() {
        if text.trim() == "/start" {
            return Some(Intent::StartSession { actor });
        }
        return Some(Intent::SubmitText {
            actor,
            text: text.to_string(),
        });
    }

    if let Some(photos) = msg.photo() {
        // Telegram lists sizes ascending; the last one is the largest.
        let largest = photos.last()?;
        return Some(Intent::SubmitImage {
            actor,
            image_ref: largest.file.id.to_string(),
        });
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    None
}

/// Translate a callback query (inline button press) into an intent.
///
/// Queries without payload data return `None`.
pub fn intent_from_callback(query: &CallbackQuery) -> Option<Intent> {
    let data = query.data.as_ref()?;
    let id = query.from.id.0 as i64;
    let actor = match query.from.username.as_ref() {
        Some(username) => ActorRef::with_handle(id, username.to_ascii_lowercase()),
        None => ActorRef::new(id),
    };
    Some(Intent::SelectOption {
        actor,
        option_id: data.clone(),
    })
}
