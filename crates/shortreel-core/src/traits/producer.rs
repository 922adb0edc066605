// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producer capability: turns a topic into a finished video.

use async_trait::async_trait;

use crate::error::ShortreelError;
use crate::types::QueuedVideo;

/// Creates videos. Implementations may take minutes per call; callers
/// cancel by dropping the returned future.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Produces a video about `topic`.
    async fn generate(&self, topic: &str) -> Result<QueuedVideo, ShortreelError>;

    /// Produces a video whose topic comes from the external content source.
    async fn generate_autonomous(&self) -> Result<QueuedVideo, ShortreelError>;
}
