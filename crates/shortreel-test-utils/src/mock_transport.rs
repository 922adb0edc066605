// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport`, recording every call as a
//! [`TransportCall`] and serving scripted update batches to `get_updates`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, Notify};

use shortreel_core::traits::{ChatTransport, PluginAdapter};
use shortreel_core::types::{
    CallbackQuery, ChatId, ChatUpdate, HealthStatus, IncomingMessage, InlineButton, MessageId,
    Sender, UpdateKind,
};
use shortreel_core::ShortreelError;

/// How long an empty `get_updates` waits for a scripted batch.
const EMPTY_POLL_WAIT: Duration = Duration::from_millis(20);

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    SendMessage {
        chat_id: ChatId,
        text: String,
    },
    SendVideo {
        chat_id: ChatId,
        path: PathBuf,
        caption: String,
        buttons: Option<Vec<InlineButton>>,
    },
    EditReplyMarkup {
        chat_id: ChatId,
        message_id: MessageId,
        buttons: Option<Vec<InlineButton>>,
    },
    EditCaption {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    },
    AnswerCallback {
        callback_id: String,
        text: String,
    },
}

/// A recording chat transport.
///
/// - **updates**: batches pushed via `push_updates()` are returned by
///   `get_updates()` in order; scripted errors via `push_poll_error()`
/// - **calls**: every egress call is captured, retrievable via `calls()`
/// - **failures**: `fail_next_videos(n)` and `fail_next_messages(n)` make
///   the next `n` sends fail
/// - **gate**: after `hold_videos()`, `send_video()` waits until
///   `release_videos()` before recording or failing
///
/// `send_video` returns message ids 100, 101, ...
pub struct MockTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    updates: Arc<Mutex<VecDeque<Result<Vec<ChatUpdate>, String>>>>,
    offsets: Arc<Mutex<Vec<i64>>>,
    notify: Arc<Notify>,
    next_message_id: AtomicI32,
    failing_videos: AtomicUsize,
    failing_messages: AtomicUsize,
    video_gate: watch::Sender<bool>,
}

impl MockTransport {
    /// Create a new mock transport with no scripted updates.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(VecDeque::new())),
            offsets: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            next_message_id: AtomicI32::new(100),
            failing_videos: AtomicUsize::new(0),
            failing_messages: AtomicUsize::new(0),
            video_gate: watch::Sender::new(true),
        }
    }

    /// Queue a batch for the next `get_updates()` call.
    pub async fn push_updates(&self, batch: Vec<ChatUpdate>) {
        self.updates.lock().await.push_back(Ok(batch));
        self.notify.notify_one();
    }

    /// Make the next `get_updates()` call fail.
    pub async fn push_poll_error(&self, message: &str) {
        self.updates.lock().await.push_back(Err(message.to_string()));
        self.notify.notify_one();
    }

    /// Make the next `n` calls to `send_video()` fail.
    pub fn fail_next_videos(&self, n: usize) {
        self.failing_videos.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls to `send_message()` fail.
    pub fn fail_next_messages(&self, n: usize) {
        self.failing_messages.store(n, Ordering::SeqCst);
    }

    /// Make `send_video()` wait until [`release_videos`](Self::release_videos).
    pub fn hold_videos(&self) {
        self.video_gate.send_replace(false);
    }

    /// Let held and future `send_video()` calls proceed.
    pub fn release_videos(&self) {
        self.video_gate.send_replace(true);
    }

    /// Every recorded egress call, in order.
    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// Offsets passed to `get_updates()`, in order.
    pub async fn polled_offsets(&self) -> Vec<i64> {
        self.offsets.lock().await.clone()
    }

    /// Texts sent to `chat_id` via `send_message()`.
    pub async fn messages_to(&self, chat_id: ChatId) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                TransportCall::SendMessage { chat_id: c, text } if *c == chat_id => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Waits until a recorded call satisfies `pred`, returning it.
    ///
    /// Panics after `timeout`.
    pub async fn wait_for_call<P>(&self, timeout: Duration, pred: P) -> TransportCall
    where
        P: Fn(&TransportCall) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(call) = self.calls.lock().await.iter().find(|c| pred(c)) {
                return call.clone();
            }
            if tokio::time::Instant::now() >= deadline {
                panic!(
                    "no matching transport call within {timeout:?}; recorded: {:#?}",
                    self.calls.lock().await
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn record(&self, call: TransportCall) {
        self.calls.lock().await.push(call);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn injected(what: &str) -> ShortreelError {
    ShortreelError::Transport {
        message: format!("injected {what} failure"),
        source: None,
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ShortreelError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), ShortreelError> {
        if take_failure(&self.failing_messages) {
            return Err(injected("send_message"));
        }
        self.record(TransportCall::SendMessage {
            chat_id,
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: &str,
        buttons: Option<&[InlineButton]>,
    ) -> Result<MessageId, ShortreelError> {
        let mut gate = self.video_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if take_failure(&self.failing_videos) {
            return Err(injected("send_video"));
        }
        self.record(TransportCall::SendVideo {
            chat_id,
            path: path.to_path_buf(),
            caption: caption.to_string(),
            buttons: buttons.map(<[InlineButton]>::to_vec),
        })
        .await;
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_reply_markup(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        buttons: Option<&[InlineButton]>,
    ) -> Result<(), ShortreelError> {
        self.record(TransportCall::EditReplyMarkup {
            chat_id,
            message_id,
            buttons: buttons.map(<[InlineButton]>::to_vec),
        })
        .await;
        Ok(())
    }

    async fn edit_caption(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), ShortreelError> {
        self.record(TransportCall::EditCaption {
            chat_id,
            message_id,
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), ShortreelError> {
        self.record(TransportCall::AnswerCallback {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>, ShortreelError> {
        self.offsets.lock().await.push(offset);

        let next = self.updates.lock().await.pop_front();
        let next = match next {
            Some(next) => next,
            None => {
                let _ = tokio::time::timeout(EMPTY_POLL_WAIT, self.notify.notified()).await;
                match self.updates.lock().await.pop_front() {
                    Some(next) => next,
                    None => return Ok(Vec::new()),
                }
            }
        };

        next.map_err(|message| ShortreelError::Transport {
            message,
            source: None,
        })
    }
}

/// A text message update from `chat_id` (sender id equals the chat id).
pub fn text_update(update_id: i64, chat_id: ChatId, text: &str) -> ChatUpdate {
    ChatUpdate {
        update_id,
        kind: UpdateKind::Message(IncomingMessage {
            chat_id,
            message_id: update_id as MessageId,
            from: Some(sender(chat_id)),
            text: text.to_string(),
        }),
    }
}

/// A button press on `message_id` in `chat_id`.
pub fn callback_update(
    update_id: i64,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    data: &str,
) -> ChatUpdate {
    ChatUpdate {
        update_id,
        kind: UpdateKind::Callback(CallbackQuery {
            id: format!("cb-{update_id}"),
            from: sender(chat_id),
            chat_id: Some(chat_id),
            message_id,
            data: data.to_string(),
        }),
    }
}

fn sender(chat_id: ChatId) -> Sender {
    Sender {
        id: chat_id,
        first_name: format!("user{chat_id}"),
        username: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_updates_returns_batches_in_order() {
        let transport = MockTransport::new();
        transport.push_updates(vec![text_update(1, 5, "/help")]).await;
        transport.push_poll_error("boom").await;

        let first = transport.get_updates(0).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(transport.get_updates(2).await.is_err());
        assert!(transport.get_updates(2).await.unwrap().is_empty());
        assert_eq!(transport.polled_offsets().await, vec![0, 2, 2]);
    }

    #[tokio::test]
    async fn send_video_assigns_increasing_ids_and_records() {
        let transport = MockTransport::new();
        let a = transport
            .send_video(1, Path::new("/v/1.mp4"), "c1", None)
            .await
            .unwrap();
        let b = transport
            .send_video(1, Path::new("/v/2.mp4"), "c2", None)
            .await
            .unwrap();
        assert_eq!((a, b), (100, 101));
        assert_eq!(transport.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn held_videos_wait_for_release() {
        let transport = Arc::new(MockTransport::new());
        transport.hold_videos();

        let sender = transport.clone();
        let send = tokio::spawn(async move {
            sender
                .send_video(1, Path::new("/v/1.mp4"), "c", None)
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(transport.calls().await.is_empty());

        transport.release_videos();
        assert_eq!(send.await.unwrap().unwrap(), 100);
        assert_eq!(transport.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let transport = MockTransport::new();
        transport.fail_next_videos(1);
        assert!(transport
            .send_video(1, Path::new("/v/1.mp4"), "c", None)
            .await
            .is_err());
        assert!(transport
            .send_video(1, Path::new("/v/1.mp4"), "c", None)
            .await
            .is_ok());

        transport.fail_next_messages(1);
        assert!(transport.send_message(1, "x").await.is_err());
        transport.send_message(1, "y").await.unwrap();
        assert_eq!(transport.messages_to(1).await, vec!["y".to_string()]);
    }
}
