// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producer and publisher backed by external programs.
//!
//! Each call spawns the configured argv, passes its inputs as the final
//! argument plus `SHORTREEL_*` environment variables, and reads a single
//! JSON object from stdout. Children are killed when the call is dropped.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shortreel_config::model::CommandConfig;
use shortreel_core::error::BoxError;
use shortreel_core::traits::{Producer, Publisher};
use shortreel_core::types::{PublishOutcome, QueuedVideo};
use shortreel_core::ShortreelError;
use tokio::process::Command;
use tracing::debug;

/// Builds the error variant of one capability.
type ErrorKind = fn(String, Option<BoxError>) -> ShortreelError;

fn producer_error(message: String, source: Option<BoxError>) -> ShortreelError {
    ShortreelError::Producer { message, source }
}

fn publisher_error(message: String, source: Option<BoxError>) -> ShortreelError {
    ShortreelError::Publisher { message, source }
}

/// What a producer program prints.
#[derive(Debug, Deserialize)]
struct ProducedVideo {
    video_path: PathBuf,
    #[serde(default)]
    preview_path: Option<PathBuf>,
    title: String,
    #[serde(default)]
    script: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// What a publisher program prints.
#[derive(Debug, Deserialize)]
struct PublishedVideo {
    url: String,
}

/// Runs `producer.command`; the topic, if any, is the final argument.
#[derive(Debug, Clone)]
pub struct CommandProducer {
    argv: Vec<String>,
}

impl CommandProducer {
    pub fn new(argv: Vec<String>) -> Result<Self, ShortreelError> {
        if argv.is_empty() {
            return Err(ShortreelError::Config(
                "producer.command is not configured".into(),
            ));
        }
        Ok(Self { argv })
    }

    pub fn from_config(config: &CommandConfig) -> Result<Self, ShortreelError> {
        Self::new(config.command.clone())
    }

    async fn produce(&self, topic: Option<&str>) -> Result<QueuedVideo, ShortreelError> {
        let mut command = command(&self.argv)?;
        if let Some(topic) = topic {
            command.arg(topic);
        }
        command
            .env("SHORTREEL_TOPIC", topic.unwrap_or_default())
            .env("SHORTREEL_AUTONOMOUS", if topic.is_none() { "1" } else { "0" });

        let produced: ProducedVideo = run_json(command, &self.argv[0], producer_error).await?;
        if produced.title.trim().is_empty() {
            return Err(producer_error("producer returned an empty title".into(), None));
        }

        let mut video = QueuedVideo::new(produced.video_path, produced.title)
            .with_script(produced.script)
            .with_tags(produced.tags);
        if let Some(preview) = produced.preview_path {
            video = video.with_preview(preview);
        }
        Ok(video)
    }
}

#[async_trait]
impl Producer for CommandProducer {
    async fn generate(&self, topic: &str) -> Result<QueuedVideo, ShortreelError> {
        self.produce(Some(topic)).await
    }

    async fn generate_autonomous(&self) -> Result<QueuedVideo, ShortreelError> {
        self.produce(None).await
    }
}

/// Runs `publisher.command` with the video path as the final argument.
#[derive(Debug, Clone)]
pub struct CommandPublisher {
    argv: Vec<String>,
}

impl CommandPublisher {
    pub fn new(argv: Vec<String>) -> Result<Self, ShortreelError> {
        if argv.is_empty() {
            return Err(ShortreelError::Config(
                "publisher.command is not configured".into(),
            ));
        }
        Ok(Self { argv })
    }

    pub fn from_config(config: &CommandConfig) -> Result<Self, ShortreelError> {
        Self::new(config.command.clone())
    }
}

#[async_trait]
impl Publisher for CommandPublisher {
    async fn publish(&self, video: &QueuedVideo) -> Result<PublishOutcome, ShortreelError> {
        let mut command = command(&self.argv)?;
        command
            .arg(&video.video_path)
            .env("SHORTREEL_TITLE", &video.title)
            .env("SHORTREEL_VIDEO_PATH", &video.video_path)
            .env("SHORTREEL_TAGS", video.tags.join(","))
            .env("SHORTREEL_SCRIPT", &video.script);

        let published: PublishedVideo = run_json(command, &self.argv[0], publisher_error).await?;
        if published.url.trim().is_empty() {
            return Err(publisher_error("publisher returned an empty url".into(), None));
        }
        Ok(PublishOutcome { url: published.url })
    }
}

fn command(argv: &[String]) -> Result<Command, ShortreelError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| ShortreelError::Config("external command is empty".into()))?;
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    Ok(command)
}

async fn run_json<T: DeserializeOwned>(
    mut command: Command,
    program: &str,
    kind: ErrorKind,
) -> Result<T, ShortreelError> {
    debug!(program, "running external command");
    let output = command
        .output()
        .await
        .map_err(|e| kind(format!("failed to start `{program}`: {e}"), Some(Box::new(e))))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(kind(
            format!("`{program}` failed ({}): {}", output.status, stderr.trim()),
            None,
        ));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| {
        kind(
            format!("`{program}` printed invalid JSON: {e}"),
            Some(Box::new(e)),
        )
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[tokio::test]
    async fn producer_passes_topic_as_final_argument() {
        // `sh -c script arg` exposes the trailing argument as $0.
        let producer = CommandProducer::new(sh(
            r#"printf '{"video_path":"/v/1.mp4","title":"%s","tags":["a","b"]}' "$0""#,
        ))
        .unwrap();

        let video = producer.generate("Weather in Oslo").await.unwrap();
        assert_eq!(video.title, "Weather in Oslo");
        assert_eq!(video.video_path, PathBuf::from("/v/1.mp4"));
        assert_eq!(video.tags, vec!["a".to_string(), "b".to_string()]);
        assert!(video.preview_path.is_none());
    }

    #[tokio::test]
    async fn producer_sets_autonomous_environment() {
        let producer = CommandProducer::new(sh(
            r#"printf '{"video_path":"/v/%s.mp4","preview_path":"/v/p.mp4","title":"t[%s]"}' "$SHORTREEL_AUTONOMOUS" "$SHORTREEL_TOPIC""#,
        ))
        .unwrap();

        let video = producer.generate_autonomous().await.unwrap();
        assert_eq!(video.video_path, PathBuf::from("/v/1.mp4"));
        assert_eq!(video.title, "t[]");
        assert_eq!(video.preview_path, Some(PathBuf::from("/v/p.mp4")));

        let video = producer.generate("cats").await.unwrap();
        assert_eq!(video.video_path, PathBuf::from("/v/0.mp4"));
        assert_eq!(video.title, "t[cats]");
    }

    #[tokio::test]
    async fn producer_failure_includes_stderr() {
        let producer = CommandProducer::new(sh("echo 'render crashed' >&2; exit 3")).unwrap();
        let err = producer.generate("cats").await.unwrap_err();
        assert!(matches!(err, ShortreelError::Producer { .. }));
        assert!(err.to_string().contains("render crashed"));
    }

    #[tokio::test]
    async fn producer_rejects_invalid_json() {
        let producer = CommandProducer::new(sh("echo not-json")).unwrap();
        let err = producer.generate_autonomous().await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn missing_program_is_a_producer_error() {
        let producer =
            CommandProducer::new(vec!["/nonexistent/shortreel-producer".into()]).unwrap();
        let err = producer.generate("cats").await.unwrap_err();
        assert!(matches!(err, ShortreelError::Producer { .. }));
    }

    #[tokio::test]
    async fn publisher_reads_url_and_environment() {
        let publisher = CommandPublisher::new(sh(
            r#"printf '{"url":"https://shorts.example/%s?tags=%s&path=%s"}' "$SHORTREEL_TITLE" "$SHORTREEL_TAGS" "$0""#,
        ))
        .unwrap();
        let video = QueuedVideo::new("/v/1.mp4", "T1").with_tags(["x", "y"]);

        let outcome = publisher.publish(&video).await.unwrap();
        assert_eq!(outcome.url, "https://shorts.example/T1?tags=x,y&path=/v/1.mp4");
    }

    #[tokio::test]
    async fn publisher_failure_is_a_publisher_error() {
        let publisher = CommandPublisher::new(sh("echo 'quota exceeded' >&2; exit 1")).unwrap();
        let err = publisher
            .publish(&QueuedVideo::new("/v/1.mp4", "T1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortreelError::Publisher { .. }));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn empty_commands_are_configuration_errors() {
        assert!(matches!(
            CommandProducer::new(Vec::new()),
            Err(ShortreelError::Config(_))
        ));
        assert!(matches!(
            CommandPublisher::from_config(&CommandConfig::default()),
            Err(ShortreelError::Config(_))
        ));
    }
}
