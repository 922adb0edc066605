// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock video producer with scripted outcomes.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shortreel_core::traits::Producer;
use shortreel_core::types::QueuedVideo;
use shortreel_core::ShortreelError;

/// One recorded `Producer` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProduceCall {
    Topic(String),
    Autonomous,
}

/// A producer that returns scripted results.
///
/// Once the script runs out it synthesizes a video named after the call,
/// with its file under the configured output directory (not created on
/// disk unless `write_files` is set).
pub struct MockProducer {
    script: Arc<Mutex<VecDeque<Result<QueuedVideo, String>>>>,
    calls: Arc<Mutex<Vec<ProduceCall>>>,
    output_dir: PathBuf,
    write_files: bool,
    delay: Duration,
    counter: AtomicUsize,
}

impl MockProducer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            output_dir: output_dir.into(),
            write_files: false,
            delay: Duration::ZERO,
            counter: AtomicUsize::new(0),
        }
    }

    /// Create the synthesized video (and preview) files on disk.
    pub fn write_files(mut self) -> Self {
        self.write_files = true;
        self
    }

    /// Sleep this long before returning each result.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Script the next call to return `video`.
    pub async fn push_video(&self, video: QueuedVideo) {
        self.script.lock().await.push_back(Ok(video));
    }

    /// Script the next call to fail with `message`.
    pub async fn push_failure(&self, message: &str) {
        self.script.lock().await.push_back(Err(message.to_string()));
    }

    pub async fn calls(&self) -> Vec<ProduceCall> {
        self.calls.lock().await.clone()
    }

    async fn produce(&self, call: ProduceCall) -> Result<QueuedVideo, ShortreelError> {
        self.calls.lock().await.push(call.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.script.lock().await.pop_front();
        match scripted {
            Some(Ok(video)) => Ok(video),
            Some(Err(message)) => Err(ShortreelError::Producer {
                message,
                source: None,
            }),
            None => self.synthesize(&call).await,
        }
    }

    async fn synthesize(&self, call: &ProduceCall) -> Result<QueuedVideo, ShortreelError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let title = match call {
            ProduceCall::Topic(topic) => format!("Video about {topic}"),
            ProduceCall::Autonomous => format!("Trending video {n}"),
        };
        let video_path = self.output_dir.join(format!("video_{n}.mp4"));
        let preview_path = self.output_dir.join(format!("video_{n}_preview.mp4"));

        if self.write_files {
            tokio::fs::create_dir_all(&self.output_dir)
                .await
                .map_err(io_error)?;
            tokio::fs::write(&video_path, b"video").await.map_err(io_error)?;
            tokio::fs::write(&preview_path, b"preview")
                .await
                .map_err(io_error)?;
        }

        Ok(QueuedVideo::new(video_path, title)
            .with_preview(preview_path)
            .with_script(format!("script {n}")))
    }
}

fn io_error(e: std::io::Error) -> ShortreelError {
    ShortreelError::Producer {
        message: format!("mock producer io: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl Producer for MockProducer {
    async fn generate(&self, topic: &str) -> Result<QueuedVideo, ShortreelError> {
        self.produce(ProduceCall::Topic(topic.to_string())).await
    }

    async fn generate_autonomous(&self) -> Result<QueuedVideo, ShortreelError> {
        self.produce(ProduceCall::Autonomous).await
    }
}
