// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Shortreel control plane.

use thiserror::Error;

/// Boxed error source carried by the adapter-facing variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Shortreel crates.
#[derive(Debug, Error)]
pub enum ShortreelError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A bounded queue rejected an `add` because it is at capacity.
    #[error("{queue} queue is full (capacity {capacity})")]
    QueueFull { queue: String, capacity: usize },

    /// A `pop` or `peek` found nothing to return.
    #[error("{queue} queue is empty")]
    QueueEmpty { queue: String },

    /// Chat transport errors (network failure, API rejection, bad identifiers).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<BoxError>,
    },

    /// Content producer failures.
    #[error("producer error: {message}")]
    Producer {
        message: String,
        source: Option<BoxError>,
    },

    /// Publisher failures.
    #[error("publisher error: {message}")]
    Publisher {
        message: String,
        source: Option<BoxError>,
    },

    /// Durable state could not be read or written.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<BoxError>,
    },

    /// A waiter observed its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShortreelError {
    /// Returns `true` for [`ShortreelError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ShortreelError::Cancelled)
    }

    /// Returns `true` for [`ShortreelError::QueueFull`].
    pub fn is_queue_full(&self) -> bool {
        matches!(self, ShortreelError::QueueFull { .. })
    }
}
