// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue of generation requests with a `pending` → `generating` lifecycle.

use std::path::Path;

use chrono::Utc;
use shortreel_core::types::{ChatId, GenerationRequest, GenerationStatus};
use shortreel_core::ShortreelError;
use tracing::{debug, info};

use crate::persistent::PersistentQueue;

/// File name of the generation queue inside the data directory.
pub const GENERATION_QUEUE_FILE: &str = "generation_queue.json";

/// Default maximum number of queued generation requests.
pub const DEFAULT_GENERATION_CAPACITY: usize = 10;

/// Durable queue of [`GenerationRequest`]s.
///
/// At most one request per originating chat is `generating` at a time.
/// Requests left `generating` by a previous process are demoted to
/// `pending` when the queue is opened.
#[derive(Debug)]
pub struct GenerationQueue {
    inner: PersistentQueue<GenerationRequest>,
}

impl GenerationQueue {
    /// Opens the queue and applies the restart recovery rule.
    pub fn open(data_dir: &Path, capacity: usize) -> Self {
        let inner: PersistentQueue<GenerationRequest> =
            PersistentQueue::open("generation", data_dir, GENERATION_QUEUE_FILE, capacity);

        let recovered = inner.modify(|items| {
            let mut count = 0;
            for item in items.iter_mut().filter(|r| r.is_generating()) {
                item.status = GenerationStatus::Pending;
                count += 1;
            }
            count
        });
        if recovered > 0 {
            info!(count = recovered, "reset interrupted generation requests to pending");
        }

        Self { inner }
    }

    /// Enqueues `request` as `pending`, stamping its creation time.
    /// Returns the request's 1-based position.
    pub fn add(&self, mut request: GenerationRequest) -> Result<usize, ShortreelError> {
        request.created_at = Utc::now();
        request.status = GenerationStatus::Pending;
        let position = self.inner.add(request)?;
        debug!(position, "generation request queued");
        Ok(position)
    }

    /// Claims the oldest pending request and marks it `generating`.
    ///
    /// Requests whose originator already has a request in flight are
    /// skipped. Fails with `QueueEmpty` when nothing is claimable.
    pub fn pop(&self) -> Result<GenerationRequest, ShortreelError> {
        self.inner
            .modify(|items| {
                let busy: Vec<ChatId> = items
                    .iter()
                    .filter(|r| r.is_generating())
                    .map(|r| r.chat_id)
                    .collect();
                let next = items.iter_mut().find(|r| {
                    r.status == GenerationStatus::Pending && !busy.contains(&r.chat_id)
                })?;
                next.status = GenerationStatus::Generating;
                Some(next.clone())
            })
            .ok_or_else(|| self.inner.empty_error())
    }

    /// Removes the in-flight request of `chat_id` after success.
    /// A no-op when there is none.
    pub fn complete(&self, chat_id: ChatId) -> Option<GenerationRequest> {
        self.remove_generating(chat_id)
    }

    /// Removes the in-flight request of `chat_id` after failure.
    /// A no-op when there is none.
    pub fn fail(&self, chat_id: ChatId) -> Option<GenerationRequest> {
        self.remove_generating(chat_id)
    }

    fn remove_generating(&self, chat_id: ChatId) -> Option<GenerationRequest> {
        self.inner
            .find_and_remove(|r| r.chat_id == chat_id && r.is_generating())
    }

    /// Whether any request is currently `generating`.
    pub fn is_generating(&self) -> bool {
        self.inner.find_first(GenerationRequest::is_generating).is_some()
    }

    /// Whether any request is waiting to be claimed.
    pub fn has_pending(&self) -> bool {
        self.inner
            .find_first(|r| r.status == GenerationStatus::Pending)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Snapshot of every request in queue order.
    pub fn list(&self) -> Vec<GenerationRequest> {
        self.inner.list()
    }
}
