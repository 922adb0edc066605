// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The update polling loop.

use std::sync::atomic::Ordering;
use std::time::Duration;

use shortreel_core::types::{ChatUpdate, UpdateKind};
use tracing::{debug, info, warn};

use crate::ApprovalService;

/// Pause after a failed `get_updates` before polling again.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

impl ApprovalService {
    /// Polls the transport until the stop signal fires.
    ///
    /// Transport errors never end the loop; they are logged and retried
    /// after [`POLL_RETRY_DELAY`].
    pub(crate) async fn poll_commands(&self) {
        info!(offset = self.offset(), "polling for chat updates");

        loop {
            let offset = self.offset();
            let result = tokio::select! {
                _ = self.stop.cancelled() => break,
                result = self.transport.get_updates(offset) => result,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!(offset, error = %e, "failed to fetch updates, retrying");
                    tokio::select! {
                        _ = self.stop.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("update polling stopped");
    }

    /// Advances the offset past `update`, then dispatches it.
    pub async fn handle_update(&self, update: ChatUpdate) {
        self.offset.fetch_max(update.update_id + 1, Ordering::SeqCst);

        match update.kind {
            UpdateKind::Message(message) => self.handle_message(message).await,
            UpdateKind::Callback(query) => self.handle_callback(query).await,
            UpdateKind::Unsupported => {
                debug!(update_id = update.update_id, "skipping unsupported update");
            }
        }
    }
}
