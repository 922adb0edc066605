// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat transport for the Shortreel control plane.
//!
//! Implements [`ChatTransport`] for the Telegram Bot API via teloxide:
//! `getUpdates` long polling, text and video egress with inline keyboards,
//! and legacy Markdown formatting with a plain-text fallback.

pub mod handler;
pub mod markdown;
pub mod media;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use shortreel_config::model::TelegramConfig;
use shortreel_core::error::ShortreelError;
use shortreel_core::traits::{ChatTransport, PluginAdapter};
use shortreel_core::types::{ChatUpdate, HealthStatus, InlineButton};
use teloxide::prelude::*;
use teloxide::types::{
    AllowedUpdate, CallbackQueryId, ChatId as TgChatId, InlineKeyboardButton,
    InlineKeyboardMarkup, MessageId as TgMessageId, ParseMode,
};
use teloxide::RequestError;
use tracing::{debug, info, warn};

/// Telegram transport implementing [`ChatTransport`].
///
/// Holds a single teloxide [`Bot`]. Every request inherits the HTTP
/// timeout from the config; `getUpdates` additionally asks the server to
/// hold the connection for `poll_timeout_secs`.
pub struct TelegramTransport {
    bot: Bot,
    poll_timeout: u32,
}

impl TelegramTransport {
    /// Creates a new Telegram transport.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, ShortreelError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ShortreelError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;

        if token.trim().is_empty() {
            return Err(ShortreelError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ShortreelError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            bot: Bot::with_client(token, client),
            poll_timeout: config.poll_timeout_secs,
        })
    }

    /// Points the bot at a different Bot API server.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ShortreelError> {
        let url = url.parse().map_err(|e| {
            ShortreelError::Config(format!("invalid Telegram API url `{url}`: {e}"))
        })?;
        self.bot = self.bot.set_api_url(url);
        Ok(self)
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ShortreelError> {
        // getMe validates the token and reachability in one call.
        match self.bot.get_me().await {
            Ok(me) => {
                info!(username = ?me.user.username, "Telegram bot reachable");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ShortreelError> {
        let chat = TgChatId(chat_id);

        #[allow(deprecated)]
        let result = self
            .bot
            .send_message(chat, text)
            .parse_mode(ParseMode::Markdown)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_parse_error(&e) => {
                warn!(error = %e, "Markdown rejected, sending as plain text");
                self.bot
                    .send_message(chat, markdown::to_plain_text(text))
                    .await
                    .map(|_| ())
                    .map_err(transport_error("failed to send message"))
            }
            Err(e) => Err(transport_error("failed to send message")(e)),
        }
    }

    async fn send_video(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
        buttons: Option<&[InlineButton]>,
    ) -> Result<i32, ShortreelError> {
        let chat = TgChatId(chat_id);
        let markup = buttons.map(keyboard);

        #[allow(deprecated)]
        let mut request = self
            .bot
            .send_video(chat, media::video_file(path).await?)
            .caption(caption)
            .parse_mode(ParseMode::Markdown);
        if let Some(markup) = markup.clone() {
            request = request.reply_markup(markup);
        }

        let sent = match request.await {
            Ok(sent) => sent,
            Err(e) if is_parse_error(&e) => {
                warn!(error = %e, "Markdown caption rejected, sending as plain text");
                let mut retry = self
                    .bot
                    .send_video(chat, media::video_file(path).await?)
                    .caption(markdown::to_plain_text(caption));
                if let Some(markup) = markup {
                    retry = retry.reply_markup(markup);
                }
                retry
                    .await
                    .map_err(transport_error("failed to send video"))?
            }
            Err(e) => return Err(transport_error("failed to send video")(e)),
        };

        debug!(chat_id, message_id = sent.id.0, "video sent");
        Ok(sent.id.0)
    }

    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i32,
        buttons: Option<&[InlineButton]>,
    ) -> Result<(), ShortreelError> {
        // Omitting reply_markup clears the keyboard.
        let mut request = self
            .bot
            .edit_message_reply_markup(TgChatId(chat_id), TgMessageId(message_id));
        if let Some(buttons) = buttons {
            request = request.reply_markup(keyboard(buttons));
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => Ok(()),
            Err(e) => Err(transport_error("failed to edit reply markup")(e)),
        }
    }

    async fn edit_caption(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
    ) -> Result<(), ShortreelError> {
        let chat = TgChatId(chat_id);
        let msg_id = TgMessageId(message_id);

        #[allow(deprecated)]
        let result = self
            .bot
            .edit_message_caption(chat, msg_id)
            .caption(text)
            .parse_mode(ParseMode::Markdown)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => Ok(()),
            Err(e) if is_parse_error(&e) => {
                warn!(error = %e, "Markdown caption edit rejected, retrying as plain text");
                self.bot
                    .edit_message_caption(chat, msg_id)
                    .caption(markdown::to_plain_text(text))
                    .await
                    .map(|_| ())
                    .map_err(transport_error("failed to edit caption"))
            }
            Err(e) => Err(transport_error("failed to edit caption")(e)),
        }
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), ShortreelError> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if !text.is_empty() {
            request = request.text(text);
        }
        request
            .await
            .map(|_| ())
            .map_err(transport_error("failed to answer callback"))
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>, ShortreelError> {
        let offset = i32::try_from(offset).map_err(|_| {
            ShortreelError::Internal(format!("update offset {offset} out of range"))
        })?;

        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(self.poll_timeout)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
            .await
            .map_err(transport_error("failed to fetch updates"))?;

        Ok(updates.into_iter().map(handler::to_chat_update).collect())
    }
}

/// Builds a single-row inline keyboard.
fn keyboard(buttons: &[InlineButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        buttons
            .iter()
            .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.data.clone()))
            .collect::<Vec<_>>(),
    ])
}

fn is_parse_error(err: &RequestError) -> bool {
    err.to_string().contains("can't parse entities")
}

fn is_not_modified(err: &RequestError) -> bool {
    err.to_string().contains("message is not modified")
}

fn transport_error(action: &'static str) -> impl FnOnce(RequestError) -> ShortreelError {
    move |e| ShortreelError::Transport {
        message: format!("{action}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortreel_core::types::approval_buttons;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(String::from),
            ..TelegramConfig::default()
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramTransport::new(&config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramTransport::new(&config(Some("  "))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let transport =
            TelegramTransport::new(&config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11")));
        assert!(transport.is_ok());
    }

    #[test]
    fn with_api_url_rejects_garbage() {
        let transport = TelegramTransport::new(&config(Some("test:token"))).unwrap();
        assert!(transport.with_api_url("not a url").is_err());
    }

    #[test]
    fn keyboard_is_a_single_row() {
        let markup = keyboard(&approval_buttons());
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "✅ Upload");
    }

    #[test]
    fn plugin_adapter_metadata() {
        let transport = TelegramTransport::new(&config(Some("test:token"))).unwrap();
        assert_eq!(transport.name(), "telegram");
        assert_eq!(transport.version(), semver::Version::new(0, 1, 0));
    }
}
