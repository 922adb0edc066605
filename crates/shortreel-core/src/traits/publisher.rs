// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher capability: uploads an approved video.

use async_trait::async_trait;

use crate::error::ShortreelError;
use crate::types::{PublishOutcome, QueuedVideo};

/// Uploads videos to the destination platform. Not retried by the caller.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, video: &QueuedVideo) -> Result<PublishOutcome, ShortreelError>;
}
