// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-valued holder of the video currently under review.
//!
//! Every method takes the slot mutex for a few field updates only; no
//! method awaits while holding it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shortreel_core::types::{ChatId, MessageId, QueuedVideo, Verdict};
use shortreel_queue::VideoQueue;
use tracing::{debug, warn};

/// The presented video plus the verdict latched for it, if any.
#[derive(Debug, Clone)]
pub struct PendingReview {
    pub video: QueuedVideo,
    pub verdict: Option<Verdict>,
}

/// Outcome of [`PendingSlot::latch_verdict`].
#[derive(Debug, Clone, PartialEq)]
pub enum LatchOutcome {
    /// The verdict was recorded for this video.
    Latched(QueuedVideo),
    /// Nothing is under review.
    Empty,
    /// The button belongs to a message other than the one under review.
    Stale,
    /// The video under review is still being sent.
    NotPresented,
    /// A verdict was already recorded for the video under review.
    AlreadyDecided,
}

#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<PendingReview>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingReview>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the head of `queue` into the slot. The video keeps its queue
    /// seat until [`take`](Self::take) or [`return_to_queue`](Self::return_to_queue).
    ///
    /// Returns the video and its 1-based position counted before the pop,
    /// or `None` when the slot is occupied or the queue is empty.
    pub fn claim_next(&self, queue: &VideoQueue) -> Option<(QueuedVideo, usize)> {
        let mut slot = self.lock();
        if slot.is_some() {
            return None;
        }
        let video = queue.take_for_review().ok()?;
        let position = queue.len() + 1;
        *slot = Some(PendingReview {
            video: video.clone(),
            verdict: None,
        });
        Some((video, position))
    }

    /// Records the review message on the video under review.
    ///
    /// Ignored when the slot no longer holds `video`.
    pub fn attach_message(&self, video: &QueuedVideo, chat_id: ChatId, message_id: MessageId) {
        let mut slot = self.lock();
        match slot.as_mut() {
            Some(review) if same_video(&review.video, video) => {
                if !review.video.attach_message(chat_id, message_id) {
                    warn!(chat_id, message_id, "review message already recorded");
                }
            }
            _ => warn!(chat_id, message_id, "slot changed before the review message was recorded"),
        }
    }

    /// Clears the slot after a failed presentation and puts the video back
    /// at the tail of `queue`, in the seat it held.
    pub fn return_to_queue(&self, video: &QueuedVideo, queue: &VideoQueue) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|r| same_video(&r.video, video)) {
            *slot = None;
        }
        let len = queue.requeue(video.clone());
        debug!(title = video.title.as_str(), queue_len = len, "video returned to the queue");
    }

    /// Records `verdict` for the video under review.
    ///
    /// `message_id` is the id of the message whose button was pressed, when
    /// the chat service reported it.
    pub fn latch_verdict(&self, message_id: Option<MessageId>, verdict: Verdict) -> LatchOutcome {
        let mut slot = self.lock();
        let Some(review) = slot.as_mut() else {
            return LatchOutcome::Empty;
        };
        let Some(presented) = review.video.message_id else {
            return LatchOutcome::NotPresented;
        };
        if message_id.is_some_and(|pressed| pressed != presented) {
            return LatchOutcome::Stale;
        }
        if review.verdict.is_some() {
            return LatchOutcome::AlreadyDecided;
        }
        review.verdict = Some(verdict);
        LatchOutcome::Latched(review.video.clone())
    }

    /// Reads and clears the slot, releasing the video's queue seat.
    pub fn take(&self, queue: &VideoQueue) -> Option<PendingReview> {
        let review = self.lock().take();
        if review.is_some() {
            queue.release_seat();
        }
        review
    }

    /// Copy of the current review, if any.
    pub fn snapshot(&self) -> Option<PendingReview> {
        self.lock().clone()
    }

    pub fn is_occupied(&self) -> bool {
        self.lock().is_some()
    }
}

fn same_video(a: &QueuedVideo, b: &QueuedVideo) -> bool {
    a.video_path == b.video_path && a.added_at == b.added_at
}
