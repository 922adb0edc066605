// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into transport-agnostic [`ChatUpdate`]s.
//!
//! Only text messages and button callbacks are meaningful to the control
//! plane. Everything else maps to [`UpdateKind::Unsupported`] so the poll
//! offset still advances past it.

use shortreel_core::types::{CallbackQuery, ChatUpdate, IncomingMessage, Sender, UpdateKind};
use teloxide::types::{Update, UpdateKind as TgUpdateKind, User};
use tracing::debug;

/// Converts one Telegram update.
pub fn to_chat_update(update: Update) -> ChatUpdate {
    let update_id = i64::from(update.id.0);
    let kind = match update.kind {
        TgUpdateKind::Message(msg) => match msg.text() {
            Some(text) => UpdateKind::Message(IncomingMessage {
                chat_id: msg.chat.id.0,
                message_id: msg.id.0,
                from: msg.from.as_ref().map(to_sender),
                text: text.to_string(),
            }),
            None => {
                debug!(update_id, "ignoring non-text message");
                UpdateKind::Unsupported
            }
        },
        TgUpdateKind::CallbackQuery(query) => UpdateKind::Callback(CallbackQuery {
            id: query.id.0.clone(),
            from: to_sender(&query.from),
            chat_id: query.message.as_ref().map(|m| m.chat().id.0),
            message_id: query.message.as_ref().map(|m| m.id().0),
            data: query.data.clone().unwrap_or_default(),
        }),
        _ => {
            debug!(update_id, "ignoring unsupported update");
            UpdateKind::Unsupported
        }
    };

    ChatUpdate { update_id, kind }
}

fn to_sender(user: &User) -> Sender {
    Sender {
        id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        username: user.username.clone(),
    }
}
