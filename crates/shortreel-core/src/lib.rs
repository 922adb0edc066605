// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Shortreel control plane.
//!
//! This crate provides the error type, the domain types persisted by the
//! queues, and the capability traits (chat transport, producer, publisher)
//! that the control plane consumes. It has no control-plane dependencies.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ShortreelError;
pub use types::{
    ChatId, GenerationRequest, GenerationStatus, HealthStatus, MessageId, QueuedVideo, Reviewer,
    Verdict,
};

pub use traits::{ChatTransport, PluginAdapter, Producer, Publisher};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortreel_error_has_all_variants() {
        let _config = ShortreelError::Config("test".into());
        let _full = ShortreelError::QueueFull {
            queue: "video".into(),
            capacity: 5,
        };
        let _empty = ShortreelError::QueueEmpty {
            queue: "video".into(),
        };
        let _transport = ShortreelError::Transport {
            message: "test".into(),
            source: None,
        };
        let _producer = ShortreelError::Producer {
            message: "test".into(),
            source: None,
        };
        let _publisher = ShortreelError::Publisher {
            message: "test".into(),
            source: None,
        };
        let _persistence = ShortreelError::Persistence {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _cancelled = ShortreelError::Cancelled;
        let _internal = ShortreelError::Internal("test".into());
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_capability_traits_are_exported() {
        fn _assert_transport<T: ChatTransport>() {}
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_producer<T: Producer>() {}
        fn _assert_publisher<T: Publisher>() {}
    }
}
