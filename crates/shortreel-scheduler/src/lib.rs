// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling loops for the Shortreel control plane.
//!
//! [`Scheduler::run`] drives three cooperating loops until cancelled:
//! - the tick loop, producing an autonomous video every interval (and once
//!   at startup) while the review queue has room
//! - the approval drain, publishing approved videos and discarding rejected
//!   ones
//! - the request drain, producing videos for `/generate` requests

pub mod shutdown;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use shortreel_approval::ApprovalService;
use shortreel_core::error::ShortreelError;
use shortreel_core::traits::{Producer, Publisher};
use shortreel_core::types::{GenerationRequest, QueuedVideo};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub use shutdown::install_signal_handler;

/// Tick interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// The tick loop plus the two drains over one [`ApprovalService`].
#[derive(Clone)]
pub struct Scheduler {
    service: Arc<ApprovalService>,
    producer: Arc<dyn Producer>,
    publisher: Arc<dyn Publisher>,
    interval: Duration,
    skip_approval: bool,
}

impl Scheduler {
    pub fn new(
        service: Arc<ApprovalService>,
        producer: Arc<dyn Producer>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            service,
            producer,
            publisher,
            interval: DEFAULT_INTERVAL,
            skip_approval: false,
        }
    }

    /// Sets the tick interval. A zero interval falls back to the default.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Publishes scheduled videos directly instead of queueing them for
    /// review.
    pub fn skip_approval(mut self, skip: bool) -> Self {
        self.skip_approval = skip;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs every loop until `cancel` fires, then waits for the drains to
    /// finish their current step.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            skip_approval = self.skip_approval,
            "scheduler starting"
        );

        let tasks = TaskTracker::new();
        {
            let this = self.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move { this.drain_approvals(&cancel).await });
        }
        {
            let this = self.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move { this.drain_requests(&cancel).await });
        }
        tasks.close();

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.tick(&cancel).await;
        }

        tasks.wait().await;
        info!("scheduler stopped");
    }

    /// One scheduled generation, skipped while the review queue is full.
    pub async fn tick(&self, cancel: &CancellationToken) {
        let videos = self.service.video_queue();
        if videos.is_full() {
            info!(
                queue_len = videos.len(),
                capacity = videos.capacity(),
                "review queue full, skipping scheduled generation"
            );
            return;
        }

        info!("scheduled generation starting");
        let produced = tokio::select! {
            _ = cancel.cancelled() => return,
            produced = self.producer.generate_autonomous() => produced,
        };

        match produced {
            Ok(video) => {
                info!(title = video.title.as_str(), "scheduled generation finished");
                if self.skip_approval {
                    self.publish_direct(video, cancel).await;
                } else if let Err(e) = self.service.queue_video(video).await {
                    warn!(error = %e, "could not queue scheduled video");
                }
            }
            Err(e) => error!(error = %e, "scheduled generation failed"),
        }
    }

    /// Publishes approved videos and discards rejected ones until `cancel`
    /// fires.
    pub async fn drain_approvals(&self, cancel: &CancellationToken) {
        loop {
            let (verdict, video) = match self.service.wait_for_result(cancel).await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    error!(error = %e, "approval drain stopped");
                    break;
                }
            };

            if verdict.approved {
                info!(
                    title = video.title.as_str(),
                    reviewer_id = verdict.reviewer_id,
                    "video approved, publishing"
                );
                self.publish(&video, cancel).await;
                if let Some(preview) = &video.preview_path {
                    remove_media(preview).await;
                }
            } else {
                info!(
                    title = video.title.as_str(),
                    reviewer_id = verdict.reviewer_id,
                    "video rejected, discarding"
                );
                remove_media(&video.video_path).await;
                if let Some(preview) = &video.preview_path {
                    remove_media(preview).await;
                }
            }
        }
        debug!("approval drain finished");
    }

    /// Produces videos for queued generation requests until `cancel` fires.
    pub async fn drain_requests(&self, cancel: &CancellationToken) {
        loop {
            let request = match self.service.wait_for_generation_request(cancel).await {
                Ok(request) => request,
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    error!(error = %e, "request drain stopped");
                    break;
                }
            };
            self.generate(&request, cancel).await;
        }
        debug!("request drain finished");
    }

    async fn generate(&self, request: &GenerationRequest, cancel: &CancellationToken) {
        self.service.notify_generating(request).await;

        let produced = tokio::select! {
            // Left `generating`; the next start demotes it to `pending`.
            _ = cancel.cancelled() => return,
            produced = self.produce(request) => produced,
        };

        match produced {
            Ok(video) => {
                info!(
                    chat_id = request.chat_id,
                    title = video.title.as_str(),
                    "requested generation finished"
                );
                self.service.notify_generation_complete(request, &video).await;
                self.service.complete_generation(request.chat_id);
                self.deliver(request, video, cancel).await;
            }
            Err(e) => {
                error!(
                    chat_id = request.chat_id,
                    topic = request.display_topic(),
                    error = %e,
                    "requested generation failed"
                );
                self.service.notify_generation_failed(request, &e).await;
                self.service.fail_generation(request.chat_id);
            }
        }
    }

    async fn produce(&self, request: &GenerationRequest) -> Result<QueuedVideo, ShortreelError> {
        if request.autonomous_source {
            self.producer.generate_autonomous().await
        } else {
            self.producer.generate(&request.topic).await
        }
    }

    async fn deliver(
        &self,
        request: &GenerationRequest,
        video: QueuedVideo,
        cancel: &CancellationToken,
    ) {
        if self.skip_approval {
            self.publish_direct(video, cancel).await;
            return;
        }

        let title = video.title.clone();
        match self.service.queue_video(video).await {
            Ok(_) => {}
            Err(e) if e.is_queue_full() => {
                warn!(
                    chat_id = request.chat_id,
                    title = title.as_str(),
                    "review queue full, video not queued"
                );
                self.service
                    .notify(
                        request.chat_id,
                        &format!("⚠️ Review queue is full; *{title}* was not queued."),
                    )
                    .await;
            }
            Err(e) => {
                error!(title = title.as_str(), error = %e, "could not queue requested video");
            }
        }
    }

    async fn publish_direct(&self, video: QueuedVideo, cancel: &CancellationToken) {
        info!(title = video.title.as_str(), "publishing without approval");
        self.publish(&video, cancel).await;
        if let Some(preview) = &video.preview_path {
            remove_media(preview).await;
        }
    }

    async fn publish(&self, video: &QueuedVideo, cancel: &CancellationToken) {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                warn!(title = video.title.as_str(), "publish interrupted by shutdown");
                return;
            }
            outcome = self.publisher.publish(video) => outcome,
        };

        match outcome {
            Ok(outcome) => {
                info!(
                    title = video.title.as_str(),
                    url = outcome.url.as_str(),
                    "video published"
                );
                self.service.notify_upload_complete(video, &outcome.url).await;
            }
            Err(e) => {
                error!(title = video.title.as_str(), error = %e, "publish failed");
                self.service.notify_upload_failed(video, &e).await;
            }
        }
    }
}

/// Best-effort delete of a media file.
async fn remove_media(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "media file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "media file already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove media file"),
    }
}
