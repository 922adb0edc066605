// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the queues, the approval service, and the adapters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Chat identifier as assigned by the chat service. Zero means "none".
pub type ChatId = i64;

/// Message identifier within a chat.
pub type MessageId = i32;

/// Callback data carried by the "Upload" button.
pub const APPROVE_TOKEN: &str = "approve";

/// Callback data carried by the "Reject" button.
pub const REJECT_TOKEN: &str = "reject";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Lifecycle tag of a [`GenerationRequest`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Generating,
}

/// A user- or scheduler-initiated request to produce one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-form topic. Empty means "pick autonomously".
    #[serde(default)]
    pub topic: String,
    /// Originating principal.
    pub chat_id: ChatId,
    /// Derive the topic from the external content source.
    #[serde(default)]
    pub autonomous_source: bool,
    pub created_at: DateTime<Utc>,
    pub status: GenerationStatus,
}

impl GenerationRequest {
    /// Creates a pending request. An empty (or blank) topic selects the
    /// autonomous source.
    pub fn new(topic: impl Into<String>, chat_id: ChatId) -> Self {
        let topic = topic.into().trim().to_string();
        let autonomous_source = topic.is_empty();
        Self {
            topic,
            chat_id,
            autonomous_source,
            created_at: Utc::now(),
            status: GenerationStatus::Pending,
        }
    }

    /// Creates a pending request for the autonomous source.
    pub fn autonomous(chat_id: ChatId) -> Self {
        Self::new(String::new(), chat_id)
    }

    pub fn is_generating(&self) -> bool {
        self.status == GenerationStatus::Generating
    }

    /// Human-readable topic for chat replies.
    pub fn display_topic(&self) -> &str {
        if self.autonomous_source && self.topic.is_empty() {
            "trending topic"
        } else {
            &self.topic
        }
    }
}

/// A produced artifact: final media plus metadata, awaiting a verdict.
///
/// Immutable after creation except for the chat back-reference, which is
/// attached once when the video is presented for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedVideo {
    pub video_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_path: Option<PathBuf>,
    pub title: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
}

impl QueuedVideo {
    pub fn new(video_path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            video_path: video_path.into(),
            preview_path: None,
            title: title.into(),
            script: String::new(),
            tags: Vec::new(),
            added_at: Utc::now(),
            chat_id: None,
            message_id: None,
        }
    }

    pub fn with_preview(mut self, preview_path: impl Into<PathBuf>) -> Self {
        self.preview_path = Some(preview_path.into());
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The file to show reviewers: the preview when present, else the final cut.
    pub fn presentation_path(&self) -> &Path {
        self.preview_path.as_deref().unwrap_or(&self.video_path)
    }

    /// The `(chat_id, message_id)` of the review message, if presented.
    pub fn message_ref(&self) -> Option<(ChatId, MessageId)> {
        match (self.chat_id, self.message_id) {
            (Some(chat), Some(msg)) => Some((chat, msg)),
            _ => None,
        }
    }

    /// Records the review message. Returns `false` (leaving the existing
    /// reference untouched) if one was already attached.
    pub fn attach_message(&mut self, chat_id: ChatId, message_id: MessageId) -> bool {
        if self.message_ref().is_some() {
            return false;
        }
        self.chat_id = Some(chat_id);
        self.message_id = Some(message_id);
        true
    }
}

/// A registered reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub chat_id: ChatId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// The outcome of a button press on a presented video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub approved: bool,
    pub reviewer_id: ChatId,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub url: String,
}

/// An inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// The single-row "Upload" / "Reject" keyboard attached to review messages.
pub fn approval_buttons() -> Vec<InlineButton> {
    vec![
        InlineButton::new("✅ Upload", APPROVE_TOKEN),
        InlineButton::new("❌ Reject", REJECT_TOKEN),
    ]
}

/// The person behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// A text message received from the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub from: Option<Sender>,
    pub text: String,
}

/// A button press received from the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackQuery {
    /// Opaque id used to acknowledge the press.
    pub id: String,
    pub from: Sender,
    /// Chat and message the pressed button belongs to, when still accessible.
    pub chat_id: Option<ChatId>,
    pub message_id: Option<MessageId>,
    pub data: String,
}

impl CallbackQuery {
    /// The chat the press originated from, falling back to the user id
    /// (identical for private chats).
    pub fn caller_chat_id(&self) -> ChatId {
        self.chat_id.unwrap_or(self.from.id)
    }
}

/// Payload of a [`ChatUpdate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Message(IncomingMessage),
    Callback(CallbackQuery),
    /// Anything else (stickers, edits, joins). Only advances the offset.
    Unsupported,
}

/// One update from the poll endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUpdate {
    pub update_id: i64,
    pub kind: UpdateKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_topic_selects_autonomous_source() {
        let req = GenerationRequest::new("   ", 42);
        assert!(req.autonomous_source);
        assert!(req.topic.is_empty());
        assert_eq!(req.status, GenerationStatus::Pending);
        assert_eq!(req.display_topic(), "trending topic");

        let req = GenerationRequest::new(" weather ", 42);
        assert!(!req.autonomous_source);
        assert_eq!(req.topic, "weather");
        assert_eq!(req.display_topic(), "weather");
    }

    #[test]
    fn generation_status_serializes_snake_case() {
        let json = serde_json::to_string(&GenerationStatus::Generating).unwrap();
        assert_eq!(json, "\"generating\"");
        assert_eq!(GenerationStatus::Pending.to_string(), "pending");
        let parsed: GenerationStatus = "generating".parse().unwrap();
        assert_eq!(parsed, GenerationStatus::Generating);
    }

    #[test]
    fn presentation_path_prefers_preview() {
        let video = QueuedVideo::new("/v/1.mp4", "T1");
        assert_eq!(video.presentation_path(), Path::new("/v/1.mp4"));

        let video = video.with_preview("/v/1_preview.mp4");
        assert_eq!(video.presentation_path(), Path::new("/v/1_preview.mp4"));
    }

    #[test]
    fn message_ref_is_attached_once() {
        let mut video = QueuedVideo::new("/v/1.mp4", "T1");
        assert_eq!(video.message_ref(), None);
        assert!(video.attach_message(999, 7));
        assert!(!video.attach_message(1, 8));
        assert_eq!(video.message_ref(), Some((999, 7)));
    }

    #[test]
    fn queued_video_omits_unset_back_reference() {
        let video = QueuedVideo::new("/v/1.mp4", "T1").with_tags(["a", "b"]);
        let json = serde_json::to_value(&video).unwrap();
        assert!(json.get("chat_id").is_none());
        assert!(json.get("message_id").is_none());
        assert!(json.get("preview_path").is_none());
        assert_eq!(json["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn approval_buttons_carry_tokens() {
        let buttons = approval_buttons();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].data, APPROVE_TOKEN);
        assert_eq!(buttons[1].data, REJECT_TOKEN);
    }

    #[test]
    fn callback_caller_falls_back_to_user_id() {
        let from = Sender {
            id: 5,
            first_name: "Ann".into(),
            username: None,
        };
        let mut query = CallbackQuery {
            id: "cb".into(),
            from,
            chat_id: None,
            message_id: None,
            data: APPROVE_TOKEN.into(),
        };
        assert_eq!(query.caller_chat_id(), 5);
        query.chat_id = Some(999);
        assert_eq!(query.caller_chat_id(), 999);
    }
}
