// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notifications.
//!
//! Request notifications go to the originating chat. Upload outcomes edit
//! the review message in place when the video has one, and otherwise fall
//! back to a new message for every reviewer (and the admin). Send failures
//! are logged and swallowed.

use shortreel_core::error::ShortreelError;
use shortreel_core::types::{ChatId, GenerationRequest, QueuedVideo};
use tracing::{debug, warn};

use crate::ApprovalService;

/// Caption of a successfully published video.
pub fn uploaded_caption(title: &str, url: &str) -> String {
    format!("*{title}*\n\n✅ Uploaded\n{url}")
}

/// Caption of a video whose upload failed.
pub fn upload_failed_caption(title: &str, error: &str) -> String {
    format!("*{title}*\n\n❌ Upload failed: {error}")
}

impl ApprovalService {
    /// Tells the requester their video is being produced.
    pub async fn notify_generating(&self, request: &GenerationRequest) {
        let text = format!(
            "🎬 Generating video about *{}*…\nThis can take a few minutes.",
            request.display_topic()
        );
        self.send_to_requester(request.chat_id, &text).await;
    }

    /// Tells the requester their video is ready.
    pub async fn notify_generation_complete(&self, request: &GenerationRequest, video: &QueuedVideo) {
        let text = format!(
            "✅ Video ready: *{}*\nIt is waiting in the review queue.",
            video.title
        );
        self.send_to_requester(request.chat_id, &text).await;
    }

    /// Tells the requester production failed.
    pub async fn notify_generation_failed(&self, request: &GenerationRequest, error: &ShortreelError) {
        let text = format!(
            "❌ Generation failed for *{}*: {error}",
            request.display_topic()
        );
        self.send_to_requester(request.chat_id, &text).await;
    }

    /// Reports a successful publish, editing the review message if any.
    pub async fn notify_upload_complete(&self, video: &QueuedVideo, url: &str) {
        self.report_outcome(video, &uploaded_caption(&video.title, url))
            .await;
    }

    /// Reports a failed publish, editing the review message if any.
    pub async fn notify_upload_failed(&self, video: &QueuedVideo, error: &ShortreelError) {
        self.report_outcome(video, &upload_failed_caption(&video.title, &error.to_string()))
            .await;
    }

    /// Sends `text` to one chat, logging failures.
    pub async fn notify(&self, chat_id: ChatId, text: &str) {
        self.send(chat_id, text).await;
    }

    async fn report_outcome(&self, video: &QueuedVideo, text: &str) {
        if let Some((chat_id, message_id)) = video.message_ref() {
            match self.transport.edit_caption(chat_id, message_id, text).await {
                Ok(()) => return,
                Err(e) => warn!(
                    chat_id,
                    message_id,
                    error = %e,
                    "failed to edit review message, broadcasting instead"
                ),
            }
        }
        self.broadcast(text).await;
    }

    // Chat id 0 marks work without an originator (the scheduler).
    async fn send_to_requester(&self, chat_id: ChatId, text: &str) {
        if chat_id != 0 {
            self.send(chat_id, text).await;
        } else if self.admin_chat_id != 0 {
            self.send(self.admin_chat_id, text).await;
        } else {
            self.broadcast(text).await;
        }
    }

    /// Sends `text` to every reviewer and the admin, once each.
    pub(crate) async fn broadcast(&self, text: &str) {
        let mut recipients = self.reviewers.chat_ids();
        if self.admin_chat_id != 0 && !recipients.contains(&self.admin_chat_id) {
            recipients.push(self.admin_chat_id);
        }
        if recipients.is_empty() {
            debug!("no reviewers to notify");
            return;
        }
        for chat_id in recipients {
            self.send(chat_id, text).await;
        }
    }

    pub(crate) async fn send(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text).await {
            warn!(chat_id, error = %e, "failed to send message");
        }
    }
}
