// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock publisher recording what it was asked to publish.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shortreel_core::traits::Publisher;
use shortreel_core::types::{PublishOutcome, QueuedVideo};
use shortreel_core::ShortreelError;

/// A publisher returning `https://shorts.example/<n>` for the n-th upload,
/// or failing while a failure message is set.
pub struct MockPublisher {
    published: Arc<Mutex<Vec<QueuedVideo>>>,
    failure: Arc<Mutex<Option<String>>>,
    counter: AtomicUsize,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            counter: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent publish fail with `message`.
    pub async fn fail_with(&self, message: &str) {
        *self.failure.lock().await = Some(message.to_string());
    }

    pub async fn succeed(&self) {
        *self.failure.lock().await = None;
    }

    /// Videos passed to `publish()`, including failed attempts.
    pub async fn published(&self) -> Vec<QueuedVideo> {
        self.published.lock().await.clone()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, video: &QueuedVideo) -> Result<PublishOutcome, ShortreelError> {
        self.published.lock().await.push(video.clone());

        if let Some(message) = self.failure.lock().await.clone() {
            return Err(ShortreelError::Publisher {
                message,
                source: None,
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PublishOutcome {
            url: format!("https://shorts.example/{n}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishes_then_fails_on_demand() {
        let publisher = MockPublisher::new();
        let video = QueuedVideo::new("/v/1.mp4", "T1");

        let outcome = publisher.publish(&video).await.unwrap();
        assert_eq!(outcome.url, "https://shorts.example/1");

        publisher.fail_with("quota exceeded").await;
        let err = publisher.publish(&video).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(publisher.published().await.len(), 2);
    }
}
