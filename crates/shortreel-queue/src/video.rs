// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue of produced videos awaiting a reviewer's verdict.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use shortreel_core::types::QueuedVideo;
use shortreel_core::ShortreelError;

use crate::persistent::PersistentQueue;

/// File name of the approval queue inside the data directory.
pub const VIDEO_QUEUE_FILE: &str = "video_queue.json";

/// Default maximum number of videos awaiting approval.
pub const DEFAULT_VIDEO_CAPACITY: usize = 5;

/// Strict FIFO of [`QueuedVideo`]s. Membership alone means "awaiting approval".
///
/// A video taken with [`take_for_review`](Self::take_for_review) keeps its
/// seat until it is released or requeued, so a failed presentation can
/// always go back to the tail. Seats are not persisted.
#[derive(Debug)]
pub struct VideoQueue {
    inner: PersistentQueue<QueuedVideo>,
    held: AtomicUsize,
}

impl VideoQueue {
    pub fn open(data_dir: &Path, capacity: usize) -> Self {
        Self {
            inner: PersistentQueue::open("video", data_dir, VIDEO_QUEUE_FILE, capacity),
            held: AtomicUsize::new(0),
        }
    }

    /// Appends `video`, stamping `added_at`. Returns the new length.
    ///
    /// Held review seats count against the capacity.
    pub fn add(&self, mut video: QueuedVideo) -> Result<usize, ShortreelError> {
        video.added_at = Utc::now();
        self.inner.modify(|items| {
            if items.len() + self.held.load(Ordering::SeqCst) >= self.inner.capacity() {
                return Err(self.inner.full_error());
            }
            items.push(video);
            Ok(items.len())
        })
    }

    pub fn pop(&self) -> Result<QueuedVideo, ShortreelError> {
        self.inner.pop()
    }

    /// Removes the head and holds its seat.
    pub fn take_for_review(&self) -> Result<QueuedVideo, ShortreelError> {
        self.inner.modify(|items| {
            if items.is_empty() {
                return Err(self.inner.empty_error());
            }
            self.held.fetch_add(1, Ordering::SeqCst);
            Ok(items.remove(0))
        })
    }

    /// Puts `video` back at the tail in the seat it held. Returns the new
    /// length.
    pub fn requeue(&self, mut video: QueuedVideo) -> usize {
        video.added_at = Utc::now();
        self.inner.modify(|items| {
            self.release_seat();
            items.push(video);
            items.len()
        })
    }

    /// Gives up the seat of a reviewed video.
    pub fn release_seat(&self) {
        let _ = self
            .held
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Seats held by videos under review.
    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }

    pub fn peek(&self) -> Result<QueuedVideo, ShortreelError> {
        self.inner.peek()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.len() + self.held() >= self.inner.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn list(&self) -> Vec<QueuedVideo> {
        self.inner.list()
    }

    pub fn clear(&self) {
        self.inner.clear()
    }
}
