// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat command dispatch.
//!
//! Commands are matched case-insensitively on their first word. A
//! `@botname` suffix (the group chat form) is ignored. Unknown commands and
//! plain text are dropped silently.

use chrono::{DateTime, Utc};
use shortreel_core::types::{ChatId, GenerationRequest, IncomingMessage, Reviewer};
use tracing::{debug, error, info};

use crate::ApprovalService;

pub(crate) const QUEUE_FULL: &str = "Queue full. Please wait.";

pub(crate) const HELP_TEXT: &str = "🎬 *Shortreel bot*

/generate <topic> - queue a video about a topic
/generate - queue a video on a trending topic
/review - review the next queued video
/queue - list videos awaiting review
/status - show the generation queue
/stop - stop receiving review notifications
/help - show this message";

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(String),
    Review,
    Queue,
    Status,
    Stop,
    Help,
}

impl Command {
    /// Parses `text`, returning `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (head, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "/generate" => Some(Command::Generate(rest.trim().to_string())),
            "/review" => Some(Command::Review),
            "/queue" => Some(Command::Queue),
            "/status" => Some(Command::Status),
            "/stop" => Some(Command::Stop),
            "/help" | "/start" => Some(Command::Help),
            _ => None,
        }
    }
}

/// Compact age such as `45s`, `12m`, `3h05m` or `2d`.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h{:02}m", s / 3600, (s % 3600) / 60),
        s => format!("{}d", s / 86_400),
    }
}

impl ApprovalService {
    pub(crate) async fn handle_message(&self, message: IncomingMessage) {
        let Some(command) = Command::parse(&message.text) else {
            debug!(chat_id = message.chat_id, "ignoring non-command message");
            return;
        };
        debug!(chat_id = message.chat_id, ?command, "dispatching command");

        match command {
            Command::Generate(topic) => self.cmd_generate(message.chat_id, &topic).await,
            Command::Review => self.cmd_review(&message).await,
            Command::Queue => self.cmd_queue(message.chat_id).await,
            Command::Status => self.cmd_status(message.chat_id).await,
            Command::Stop => self.cmd_stop(message.chat_id).await,
            Command::Help => self.send(message.chat_id, HELP_TEXT).await,
        }
    }

    fn is_admin_only_denied(&self, chat_id: ChatId) -> bool {
        self.admin_chat_id != 0 && chat_id != self.admin_chat_id
    }

    async fn cmd_generate(&self, chat_id: ChatId, topic: &str) {
        if self.generations.is_full() {
            self.send(chat_id, QUEUE_FULL).await;
            return;
        }

        let in_flight = self.generations.is_generating();
        let request = GenerationRequest::new(topic, chat_id);
        let shown = request.display_topic().to_string();

        match self.generations.add(request) {
            Ok(position) => {
                self.signal_generation_request();
                info!(chat_id, topic = shown.as_str(), position, "generation request queued");

                let status = if in_flight {
                    "Another video is generating; yours will follow."
                } else {
                    "Generation starts shortly."
                };
                self.send(
                    chat_id,
                    &format!("📝 Queued video about *{shown}* (position {position}).\n{status}"),
                )
                .await;
            }
            Err(e) if e.is_queue_full() => self.send(chat_id, QUEUE_FULL).await,
            Err(e) => {
                error!(chat_id, error = %e, "failed to queue generation request");
                self.send(chat_id, &format!("❌ Could not queue request: {e}"))
                    .await;
            }
        }
    }

    async fn cmd_review(&self, message: &IncomingMessage) {
        let chat_id = message.chat_id;
        if self.is_admin_only_denied(chat_id) {
            self.send(chat_id, "⛔ Only the admin can review videos.")
                .await;
            return;
        }

        let (name, username) = match &message.from {
            Some(from) => (from.first_name.clone(), from.username.clone()),
            None => ("reviewer".to_string(), None),
        };
        if self.reviewers.register(Reviewer {
            chat_id,
            name,
            username,
        }) {
            self.send(chat_id, "👋 You are now a reviewer.").await;
        }

        if self.slot.is_occupied() {
            self.send(
                chat_id,
                "⏳ A video is already under review. Please wait for its verdict.",
            )
            .await;
            return;
        }
        if self.videos.is_empty() {
            self.send(chat_id, "📭 No videos waiting for review.").await;
            return;
        }

        self.present_next(chat_id).await;
    }

    async fn cmd_queue(&self, chat_id: ChatId) {
        if self.is_admin_only_denied(chat_id) {
            self.send(chat_id, "⛔ Only the admin can view the review queue.")
                .await;
            return;
        }

        let now = Utc::now();
        let mut lines = Vec::new();
        if let Some(review) = self.slot.snapshot() {
            lines.push(format!("👀 Under review: *{}*", review.video.title));
        }

        let videos = self.videos.list();
        if videos.is_empty() {
            lines.push("📭 Review queue is empty.".to_string());
        } else {
            lines.push(format!(
                "📋 *Review queue* ({}/{})",
                videos.len(),
                self.videos.capacity()
            ));
            for (i, video) in videos.iter().enumerate() {
                lines.push(format!(
                    "{}. {} ({} ago)",
                    i + 1,
                    video.title,
                    format_age(video.added_at, now)
                ));
            }
        }

        self.send(chat_id, &lines.join("\n")).await;
    }

    async fn cmd_status(&self, chat_id: ChatId) {
        let requests = self.generations.list();
        if requests.is_empty() {
            self.send(chat_id, "💤 No generation requests queued.").await;
            return;
        }

        let now = Utc::now();
        let mut lines = vec![format!(
            "📊 *Generation queue* ({}/{})",
            requests.len(),
            self.generations.capacity()
        )];
        for request in &requests {
            let (marker, state) = if request.is_generating() {
                ("🎬", "generating")
            } else {
                ("⏳", "pending")
            };
            lines.push(format!(
                "{marker} {} ({state}, {} ago)",
                request.display_topic(),
                format_age(request.created_at, now)
            ));
        }

        self.send(chat_id, &lines.join("\n")).await;
    }

    async fn cmd_stop(&self, chat_id: ChatId) {
        let text = if self.reviewers.remove(chat_id) {
            "👋 You will no longer receive review notifications."
        } else {
            "You were not registered as a reviewer."
        };
        self.send(chat_id, text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parse_is_case_insensitive_and_strips_bot_suffix() {
        assert_eq!(
            Command::parse("/Generate Weather in Oslo"),
            Some(Command::Generate("Weather in Oslo".into()))
        );
        assert_eq!(Command::parse("/review@shortreel_bot"), Some(Command::Review));
        assert_eq!(
            Command::parse("/generate@shortreel_bot  cats "),
            Some(Command::Generate("cats".into()))
        );
        assert_eq!(Command::parse("/START"), Some(Command::Help));
    }

    #[test]
    fn parse_empty_generate_selects_autonomous() {
        assert_eq!(Command::parse("/generate"), Some(Command::Generate(String::new())));
    }

    #[test]
    fn parse_ignores_plain_text_and_unknown_commands() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn format_age_buckets() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(5), now), "5s");
        assert_eq!(format_age(now - Duration::minutes(12), now), "12m");
        assert_eq!(format_age(now - Duration::minutes(185), now), "3h05m");
        assert_eq!(format_age(now - Duration::days(2), now), "2d");
        assert_eq!(format_age(now + Duration::seconds(5), now), "0s");
    }
}
