// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for approval-flow integration testing.
//!
//! `TestHarness` wires an [`ApprovalService`] to a [`MockTransport`] over a
//! temp data directory. `reopen()` builds a fresh service over the same
//! directory to exercise restart behavior.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use shortreel_approval::{ApprovalOptions, ApprovalService};
use shortreel_core::types::{ChatId, ChatUpdate, MessageId, QueuedVideo};
use shortreel_queue::{DEFAULT_GENERATION_CAPACITY, DEFAULT_VIDEO_CAPACITY};

use crate::mock_transport::{callback_update, text_update, MockTransport};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    admin_chat_id: ChatId,
    video_queue_capacity: usize,
    generation_queue_capacity: usize,
    preview_duration: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            admin_chat_id: 0,
            video_queue_capacity: DEFAULT_VIDEO_CAPACITY,
            generation_queue_capacity: DEFAULT_GENERATION_CAPACITY,
            preview_duration: Duration::from_secs(30),
        }
    }

    /// Designate `chat_id` as the only chat allowed to review.
    pub fn with_admin(mut self, chat_id: ChatId) -> Self {
        self.admin_chat_id = chat_id;
        self
    }

    pub fn with_video_capacity(mut self, capacity: usize) -> Self {
        self.video_queue_capacity = capacity;
        self
    }

    pub fn with_generation_capacity(mut self, capacity: usize) -> Self {
        self.generation_queue_capacity = capacity;
        self
    }

    pub fn with_preview_duration(mut self, duration: Duration) -> Self {
        self.preview_duration = duration;
        self
    }

    /// Build the harness over a new temp directory.
    pub fn build(self) -> std::io::Result<TestHarness> {
        let temp_dir = tempfile::TempDir::new()?;
        let transport = Arc::new(MockTransport::new());
        let options = self.options(temp_dir.path());
        let service = Arc::new(ApprovalService::new(transport.clone(), options.clone()));

        Ok(TestHarness {
            transport,
            service,
            options,
            next_update_id: std::sync::atomic::AtomicI64::new(1),
            _temp_dir: temp_dir,
        })
    }

    fn options(&self, dir: &Path) -> ApprovalOptions {
        let mut options = ApprovalOptions::new(dir).with_admin(self.admin_chat_id);
        options.video_queue_capacity = self.video_queue_capacity;
        options.generation_queue_capacity = self.generation_queue_capacity;
        options.preview_duration = self.preview_duration;
        options
    }
}

/// An approval service over mock transport and temp storage.
pub struct TestHarness {
    /// The recording transport.
    pub transport: Arc<MockTransport>,
    /// The service under test.
    pub service: Arc<ApprovalService>,
    /// Options the service was built with.
    pub options: ApprovalOptions,
    next_update_id: std::sync::atomic::AtomicI64,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Directory holding the queue and reviewer files.
    pub fn data_dir(&self) -> &Path {
        &self.options.data_dir
    }

    /// A new service over the same data directory and transport, as after
    /// a restart. The old service is left untouched.
    pub fn reopen(&self) -> Arc<ApprovalService> {
        Arc::new(ApprovalService::new(
            self.transport.clone(),
            self.options.clone(),
        ))
    }

    /// Writes an empty file under the data directory and returns a video
    /// pointing at it.
    pub fn video(&self, name: &str, title: &str) -> std::io::Result<QueuedVideo> {
        let path = self.data_dir().join(format!("{name}.mp4"));
        std::fs::write(&path, b"video")?;
        Ok(QueuedVideo::new(path, title))
    }

    /// Dispatches a text message from `chat_id` directly, bypassing the
    /// poll loop.
    pub async fn send_text(&self, chat_id: ChatId, text: &str) {
        let update = text_update(self.next_id(), chat_id, text);
        self.service.handle_update(update).await;
    }

    /// Dispatches a button press from `chat_id` on `message_id`.
    pub async fn press(&self, chat_id: ChatId, message_id: Option<MessageId>, data: &str) {
        let update = callback_update(self.next_id(), chat_id, message_id, data);
        self.service.handle_update(update).await;
    }

    /// Scripts `updates` for the poll loop.
    pub async fn push_updates(&self, updates: Vec<ChatUpdate>) {
        self.transport.push_updates(updates).await;
    }

    fn next_id(&self) -> i64 {
        self.next_update_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}
