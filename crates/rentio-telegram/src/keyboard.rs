// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboard rendering for notification choices.

use rentio_core::types::Choice;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Buttons per keyboard row.
const ROW_WIDTH: usize = 2;

/// Render notification choices as an inline keyboard, two buttons per row.
///
/// Returns `None` when there are no choices so plain messages carry no
/// reply markup at all.
pub fn markup_for(choices: &[Choice]) -> Option<InlineKeyboardMarkup> {
    if choices.is_empty() {
        return None;
    }
    let rows: Vec<Vec<InlineKeyboardButton>> = choices
        .chunks(ROW_WIDTH)
        .map(|row| {
            row.iter()
                .map(|c| InlineKeyboardButton::callback(c.label.clone(), c.id.clone()))
                .collect()
        })
        .collect();
    Some(InlineKeyboardMarkup::new(rows))
}
