// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions consumed by the control plane.
//!
//! All capabilities use `#[async_trait]` for dynamic dispatch, so mock,
//! command-backed, and remote implementations can be swapped freely.

pub mod adapter;
pub mod producer;
pub mod publisher;
pub mod transport;

pub use adapter::PluginAdapter;
pub use producer::Producer;
pub use publisher::Publisher;
pub use transport::ChatTransport;
