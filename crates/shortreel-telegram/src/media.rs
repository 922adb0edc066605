// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local media uploads.

use std::path::Path;

use shortreel_core::error::ShortreelError;
use teloxide::types::InputFile;
use tracing::debug;

/// Resolves `path` into an uploadable [`InputFile`].
///
/// Fails before any network traffic when the file is missing or is not a
/// regular file, so callers can requeue without a half-sent message.
pub async fn video_file(path: &Path) -> Result<InputFile, ShortreelError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ShortreelError::Transport {
            message: format!("cannot read video {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

    if !metadata.is_file() {
        return Err(ShortreelError::Transport {
            message: format!("{} is not a regular file", path.display()),
            source: None,
        });
    }

    debug!(path = %path.display(), size = metadata.len(), "uploading video");
    Ok(InputFile::file(path))
}
