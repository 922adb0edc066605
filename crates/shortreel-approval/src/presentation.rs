// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review presentation and button handling.
//!
//! At most one video is presented at a time. A press latches a verdict on
//! the presented video and pushes it onto the result channel; the slot is
//! only freed by [`ApprovalService::wait_for_result`].

use std::time::Duration;

use shortreel_core::types::{
    approval_buttons, CallbackQuery, ChatId, QueuedVideo, Verdict, APPROVE_TOKEN,
};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::slot::LatchOutcome;
use crate::ApprovalService;

pub(crate) const NOT_AUTHORIZED: &str = "Not authorized";
pub(crate) const NO_VIDEO_PENDING: &str = "No video pending";
pub(crate) const NO_LONGER_PENDING: &str = "This video is no longer pending";
pub(crate) const ALREADY_DECIDED: &str = "Already decided";
pub(crate) const STILL_SENDING: &str = "This video is still being sent";

/// Caption of a review message: `position` of `capacity` slots.
pub fn review_caption(
    video: &QueuedVideo,
    position: usize,
    capacity: usize,
    preview_duration: Duration,
) -> String {
    let mut caption = format!(
        "*{}*\n\n📹 Video {position}/{capacity} remaining in queue",
        video.title
    );
    if video.preview_path.is_some() {
        caption.push_str(&format!(
            "\n🎞 Preview: first {}s of the final cut",
            preview_duration.as_secs()
        ));
    }
    caption
}

/// Caption shown once a verdict is in.
pub fn verdict_caption(title: &str, approved: bool) -> String {
    if approved {
        format!("*{title}*\n\n⏳ Uploading…")
    } else {
        format!("*{title}*\n\n❌ Rejected")
    }
}

impl ApprovalService {
    /// Presents the head of the review queue to `chat_id`.
    ///
    /// Does nothing while another video is under review or when the queue
    /// is empty. A failed send puts the video back at the tail.
    pub(crate) async fn present_next(&self, chat_id: ChatId) {
        let Some((video, position)) = self.slot.claim_next(&self.videos) else {
            debug!(chat_id, "nothing to present");
            return;
        };

        let caption = review_caption(
            &video,
            position,
            self.videos.capacity(),
            self.preview_duration,
        );
        let buttons = approval_buttons();

        match self
            .transport
            .send_video(chat_id, video.presentation_path(), &caption, Some(&buttons))
            .await
        {
            Ok(message_id) => {
                self.slot.attach_message(&video, chat_id, message_id);
                info!(
                    chat_id,
                    message_id,
                    title = video.title.as_str(),
                    "video presented for review"
                );
            }
            Err(e) => {
                error!(
                    chat_id,
                    title = video.title.as_str(),
                    error = %e,
                    "failed to present video, returning it to the queue"
                );
                self.slot.return_to_queue(&video, &self.videos);
            }
        }
    }

    /// Handles an Upload/Reject button press.
    pub(crate) async fn handle_callback(&self, query: CallbackQuery) {
        let caller = query.caller_chat_id();

        if self.admin_chat_id != 0 && caller != self.admin_chat_id {
            warn!(chat_id = caller, "callback from non-admin chat");
            self.answer(&query.id, NOT_AUTHORIZED).await;
            return;
        }

        let verdict = Verdict {
            approved: query.data == APPROVE_TOKEN,
            reviewer_id: caller,
        };

        let video = match self.slot.latch_verdict(query.message_id, verdict) {
            LatchOutcome::Latched(video) => video,
            LatchOutcome::Empty => {
                self.answer(&query.id, NO_VIDEO_PENDING).await;
                return;
            }
            LatchOutcome::Stale => {
                debug!(chat_id = caller, message_id = ?query.message_id, "stale review button");
                self.answer(&query.id, NO_LONGER_PENDING).await;
                return;
            }
            LatchOutcome::NotPresented => {
                debug!(chat_id = caller, message_id = ?query.message_id, "press before presentation finished");
                self.answer(&query.id, STILL_SENDING).await;
                return;
            }
            LatchOutcome::AlreadyDecided => {
                self.answer(&query.id, ALREADY_DECIDED).await;
                return;
            }
        };

        info!(
            title = video.title.as_str(),
            approved = verdict.approved,
            reviewer_id = caller,
            "verdict received"
        );

        self.answer(&query.id, "").await;

        let message = video
            .message_ref()
            .or_else(|| query.chat_id.zip(query.message_id));
        if let Some((chat_id, message_id)) = message {
            if let Err(e) = self
                .transport
                .edit_reply_markup(chat_id, message_id, None)
                .await
            {
                warn!(chat_id, message_id, error = %e, "failed to clear review buttons");
            }
            if let Err(e) = self
                .transport
                .edit_caption(
                    chat_id,
                    message_id,
                    &verdict_caption(&video.title, verdict.approved),
                )
                .await
            {
                warn!(chat_id, message_id, error = %e, "failed to update review caption");
            }
        }

        match self.result_tx.try_send(verdict) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(title = video.title.as_str(), "result channel full, verdict dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(title = video.title.as_str(), "result channel closed, verdict dropped");
            }
        }

        let remaining = self.videos.len();
        if remaining > 0 {
            self.send(
                caller,
                &format!("📬 {remaining} more video(s) waiting. Send /review for the next one."),
            )
            .await;
        }
    }

    async fn answer(&self, callback_id: &str, text: &str) {
        if let Err(e) = self.transport.answer_callback(callback_id, text).await {
            warn!(callback_id, error = %e, "failed to answer callback");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_caption_without_preview() {
        let video = QueuedVideo::new("/v/1.mp4", "T1");
        assert_eq!(
            review_caption(&video, 1, 5, Duration::from_secs(30)),
            "*T1*\n\n📹 Video 1/5 remaining in queue"
        );
    }

    #[test]
    fn review_caption_mentions_preview_length() {
        let video = QueuedVideo::new("/v/1.mp4", "T1").with_preview("/v/1_preview.mp4");
        let caption = review_caption(&video, 2, 5, Duration::from_secs(20));
        assert!(caption.starts_with("*T1*\n\n📹 Video 2/5 remaining in queue"));
        assert!(caption.contains("first 20s"));
    }

    #[test]
    fn verdict_captions() {
        assert_eq!(verdict_caption("T1", true), "*T1*\n\n⏳ Uploading…");
        assert_eq!(verdict_caption("T1", false), "*T1*\n\n❌ Rejected");
    }
}
