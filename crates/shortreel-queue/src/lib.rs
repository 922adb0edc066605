// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable bounded queues for the Shortreel control plane.
//!
//! [`PersistentQueue`] is a generic FIFO whose every mutation is mirrored to
//! a JSON file. [`GenerationQueue`] and [`VideoQueue`] specialize it for
//! generation requests and for videos awaiting review.

pub mod generation;
pub mod persistent;
pub mod video;

pub use generation::{GenerationQueue, DEFAULT_GENERATION_CAPACITY, GENERATION_QUEUE_FILE};
pub use persistent::PersistentQueue;
pub use video::{VideoQueue, DEFAULT_VIDEO_CAPACITY, VIDEO_QUEUE_FILE};
