// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat transport capability: poll-based ingress, message and media egress.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ShortreelError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, ChatUpdate, InlineButton, MessageId};

/// Connection to a remote chat service.
///
/// Text is formatted with the service's markdown subset. Callers decide
/// which failures to swallow; implementations always report them.
#[async_trait]
pub trait ChatTransport: PluginAdapter {
    /// Sends a text message.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), ShortreelError>;

    /// Uploads a video with a caption and an optional single row of inline
    /// buttons. Returns the id of the created message.
    async fn send_video(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: &str,
        buttons: Option<&[InlineButton]>,
    ) -> Result<MessageId, ShortreelError>;

    /// Replaces the inline buttons of a message, or clears them with `None`.
    async fn edit_reply_markup(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        buttons: Option<&[InlineButton]>,
    ) -> Result<(), ShortreelError>;

    /// Replaces the caption of a media message.
    async fn edit_caption(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), ShortreelError>;

    /// Acknowledges a button press, optionally showing a toast.
    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), ShortreelError>;

    /// Long-polls for updates with `update_id >= offset`. May return empty.
    async fn get_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>, ShortreelError>;
}
