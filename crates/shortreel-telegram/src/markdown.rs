// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy Markdown helpers for the Telegram Bot API.
//!
//! Captions use the legacy `Markdown` parse mode, where `*bold*`,
//! `_italic_` and `` `code` `` are the only entities in practice. When
//! Telegram cannot parse a text (an unbalanced `_` in a URL is the usual
//! culprit) the transport resends it through [`to_plain_text`].

/// Markers removed by [`to_plain_text`]. Underscores stay since they
/// show up in URLs and file names.
const MARKERS: &[char] = &['*', '`'];

/// Strips the emphasis markers the control plane emits.
pub fn to_plain_text(text: &str) -> String {
    text.chars().filter(|c| !MARKERS.contains(c)).collect()
}
