// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Shortreel integration tests.
//!
//! Provides mock capabilities and a test harness for fast, deterministic
//! tests without a real chat network or video pipeline.
//!
//! # Components
//!
//! - [`MockTransport`] - Recording chat transport with scripted updates
//! - [`MockProducer`] - Producer with scripted videos and failures
//! - [`MockPublisher`] - Publisher with configurable failure
//! - [`TestHarness`] - Approval service over mock transport and temp storage

pub mod harness;
pub mod mock_producer;
pub mod mock_publisher;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_producer::{MockProducer, ProduceCall};
pub use mock_publisher::MockPublisher;
pub use mock_transport::{callback_update, text_update, MockTransport, TransportCall};
