// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-in-the-loop approval service for the Shortreel control plane.
//!
//! The [`ApprovalService`] is the orchestrator that:
//! - Owns the generation and review queues
//! - Polls the chat transport for commands and button presses
//! - Presents one video at a time for review and pairs the verdict with it
//! - Hands generation requests to the worker through a signal channel
//! - Echoes generation and upload outcomes back to chat

pub mod commands;
pub mod notify;
pub mod poll;
pub mod presentation;
pub mod reviewers;
pub mod slot;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shortreel_config::ShortreelConfig;
use shortreel_core::error::ShortreelError;
use shortreel_core::traits::ChatTransport;
use shortreel_core::types::{ChatId, GenerationRequest, QueuedVideo, Verdict};
use shortreel_queue::{
    GenerationQueue, VideoQueue, DEFAULT_GENERATION_CAPACITY, DEFAULT_VIDEO_CAPACITY,
};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::reviewers::ReviewerRegistry;
use crate::slot::PendingSlot;

pub use crate::presentation::{review_caption, verdict_caption};
pub use crate::slot::PendingReview;

/// Preview length used when none (or zero) is configured.
pub const DEFAULT_PREVIEW_DURATION: Duration = Duration::from_secs(30);

/// Construction parameters for [`ApprovalService`].
#[derive(Debug, Clone)]
pub struct ApprovalOptions {
    /// Directory holding the queue and reviewer files.
    pub data_dir: PathBuf,
    /// Chat allowed to review. `0` means no designated admin.
    pub admin_chat_id: ChatId,
    pub preview_duration: Duration,
    pub video_queue_capacity: usize,
    pub generation_queue_capacity: usize,
}

impl ApprovalOptions {
    /// Options with default capacities and no admin.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            admin_chat_id: 0,
            preview_duration: DEFAULT_PREVIEW_DURATION,
            video_queue_capacity: DEFAULT_VIDEO_CAPACITY,
            generation_queue_capacity: DEFAULT_GENERATION_CAPACITY,
        }
    }

    pub fn from_config(config: &ShortreelConfig) -> Self {
        Self {
            data_dir: config.storage.data_dir(),
            admin_chat_id: config.telegram.admin_chat_id,
            preview_duration: config.approval.preview_duration(),
            video_queue_capacity: config.approval.video_queue_capacity,
            generation_queue_capacity: config.approval.generation_queue_capacity,
        }
    }

    pub fn with_admin(mut self, admin_chat_id: ChatId) -> Self {
        self.admin_chat_id = admin_chat_id;
        self
    }
}

/// Synchronous acknowledgement of [`ApprovalService::request_approval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalAck {
    /// Length of the review queue right after the video was added.
    pub position: usize,
}

/// The approval orchestrator.
///
/// Exactly one task may call [`wait_for_result`](Self::wait_for_result)
/// and exactly one may call
/// [`wait_for_generation_request`](Self::wait_for_generation_request);
/// both receivers sit behind a mutex so a second consumer only queues up.
pub struct ApprovalService {
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) admin_chat_id: ChatId,
    pub(crate) preview_duration: Duration,
    pub(crate) reviewers: ReviewerRegistry,
    pub(crate) offset: AtomicI64,
    pub(crate) videos: VideoQueue,
    pub(crate) generations: GenerationQueue,
    pub(crate) slot: PendingSlot,
    pub(crate) result_tx: mpsc::Sender<Verdict>,
    result_rx: Mutex<mpsc::Receiver<Verdict>>,
    request_tx: mpsc::Sender<()>,
    request_rx: Mutex<mpsc::Receiver<()>>,
    pub(crate) stop: CancellationToken,
    tasks: TaskTracker,
    bot_started: AtomicBool,
}

impl ApprovalService {
    /// Opens the queues and reviewer registry under `options.data_dir`.
    ///
    /// Generation requests left `generating` by a previous run are demoted
    /// to `pending` here.
    pub fn new(transport: Arc<dyn ChatTransport>, options: ApprovalOptions) -> Self {
        let preview_duration = if options.preview_duration.is_zero() {
            DEFAULT_PREVIEW_DURATION
        } else {
            options.preview_duration
        };

        let videos = VideoQueue::open(&options.data_dir, options.video_queue_capacity);
        let generations =
            GenerationQueue::open(&options.data_dir, options.generation_queue_capacity);
        let reviewers = ReviewerRegistry::open(&options.data_dir);

        let (result_tx, result_rx) = mpsc::channel(1);
        let (request_tx, request_rx) = mpsc::channel(options.generation_queue_capacity.max(1));

        info!(
            admin_chat_id = options.admin_chat_id,
            data_dir = %options.data_dir.display(),
            videos = videos.len(),
            generation_requests = generations.len(),
            reviewers = reviewers.len(),
            "approval service initialized"
        );

        Self {
            transport,
            admin_chat_id: options.admin_chat_id,
            preview_duration,
            reviewers,
            offset: AtomicI64::new(0),
            videos,
            generations,
            slot: PendingSlot::new(),
            result_tx,
            result_rx: Mutex::new(result_rx),
            request_tx,
            request_rx: Mutex::new(request_rx),
            stop: CancellationToken::new(),
            tasks: TaskTracker::new(),
            bot_started: AtomicBool::new(false),
        }
    }

    /// Adds `video` to the review queue.
    ///
    /// With an admin configured the video is presented to the admin right
    /// away (a no-op while another review is pending). Otherwise every
    /// reviewer is told a new video is waiting. Returns the queue length.
    pub async fn queue_video(&self, video: QueuedVideo) -> Result<usize, ShortreelError> {
        let title = video.title.clone();
        let len = self.videos.add(video)?;
        info!(title = title.as_str(), queue_len = len, "video queued for review");

        if self.admin_chat_id != 0 {
            self.present_next(self.admin_chat_id).await;
        } else {
            self.broadcast(&format!(
                "📥 New video queued: *{title}*\n{len} waiting. Send /review to start."
            ))
            .await;
        }
        Ok(len)
    }

    /// Queues `video` for review and acknowledges without waiting for the
    /// verdict. Verdicts arrive through [`wait_for_result`](Self::wait_for_result).
    pub async fn request_approval(&self, video: QueuedVideo) -> Result<ApprovalAck, ShortreelError> {
        let position = self.queue_video(video).await?;
        Ok(ApprovalAck { position })
    }

    /// Waits for the next verdict and returns it with the video it was
    /// given for, clearing the pending slot.
    ///
    /// Returns [`ShortreelError::Cancelled`] once `cancel` fires.
    pub async fn wait_for_result(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(Verdict, QueuedVideo), ShortreelError> {
        let mut results = self.result_rx.lock().await;
        loop {
            let verdict = tokio::select! {
                _ = cancel.cancelled() => return Err(ShortreelError::Cancelled),
                verdict = results.recv() => verdict.ok_or_else(|| {
                    ShortreelError::Internal("result channel closed".into())
                })?,
            };

            match self.slot.take(&self.videos) {
                Some(review) => {
                    debug!(
                        title = review.video.title.as_str(),
                        approved = verdict.approved,
                        "verdict paired with pending video"
                    );
                    return Ok((verdict, review.video));
                }
                None => warn!(approved = verdict.approved, "verdict arrived with no pending video, ignoring"),
            }
        }
    }

    /// Claims the next generation request, waiting for one to be queued.
    ///
    /// Returns [`ShortreelError::Cancelled`] once `cancel` fires.
    pub async fn wait_for_generation_request(
        &self,
        cancel: &CancellationToken,
    ) -> Result<GenerationRequest, ShortreelError> {
        let mut signals = self.request_rx.lock().await;
        loop {
            if cancel.is_cancelled() {
                return Err(ShortreelError::Cancelled);
            }
            match self.generations.pop() {
                Ok(request) => {
                    info!(
                        chat_id = request.chat_id,
                        topic = request.display_topic(),
                        "generation request claimed"
                    );
                    return Ok(request);
                }
                Err(ShortreelError::QueueEmpty { .. }) => {}
                Err(e) => return Err(e),
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(ShortreelError::Cancelled),
                signal = signals.recv() => {
                    if signal.is_none() {
                        return Err(ShortreelError::Internal("request channel closed".into()));
                    }
                }
            }
        }
    }

    /// Removes the in-flight request of `chat_id` after success.
    pub fn complete_generation(&self, chat_id: ChatId) {
        if self.generations.complete(chat_id).is_some() {
            self.wake_if_pending();
        }
    }

    /// Removes the in-flight request of `chat_id` after failure.
    pub fn fail_generation(&self, chat_id: ChatId) {
        if self.generations.fail(chat_id).is_some() {
            self.wake_if_pending();
        }
    }

    // Requests held back behind a finished one become claimable now.
    fn wake_if_pending(&self) {
        if self.generations.has_pending() {
            self.signal_generation_request();
        }
    }

    /// Non-blocking nudge for the request drain. Extra signals coalesce;
    /// the request itself is already durable in the queue.
    pub(crate) fn signal_generation_request(&self) {
        if let Err(mpsc::error::TrySendError::Closed(())) = self.request_tx.try_send(()) {
            warn!("request signal channel closed");
        }
    }

    /// Spawns the update polling task. Calling it twice is a no-op.
    pub fn start_bot(self: &Arc<Self>) {
        if self.bot_started.swap(true, Ordering::SeqCst) {
            debug!("approval bot already started");
            return;
        }
        let service = Arc::clone(self);
        self.tasks.spawn(async move { service.poll_commands().await });
        info!("approval bot started");
    }

    /// Stops the polling task and waits for it to finish.
    ///
    /// The service cannot be restarted afterwards.
    pub async fn stop_bot(&self) {
        self.stop.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        info!("approval bot stopped");
    }

    pub fn admin_chat_id(&self) -> ChatId {
        self.admin_chat_id
    }

    pub fn preview_duration(&self) -> Duration {
        self.preview_duration
    }

    /// Next update id the poll loop will ask for.
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }

    pub fn video_queue(&self) -> &VideoQueue {
        &self.videos
    }

    pub fn generation_queue(&self) -> &GenerationQueue {
        &self.generations
    }

    pub fn reviewers(&self) -> &ReviewerRegistry {
        &self.reviewers
    }

    /// Copy of the review currently in the pending slot.
    pub fn pending(&self) -> Option<PendingReview> {
        self.slot.snapshot()
    }
}
