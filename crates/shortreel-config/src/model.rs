// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Shortreel control plane.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shortreel_core::ShortreelError;

use crate::duration::parse_duration;

/// Top-level Shortreel configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShortreelConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Where queue and reviewer state is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Review flow settings.
    #[serde(default)]
    pub approval: ApprovalConfig,

    /// Autonomous generation settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// External program that produces videos.
    #[serde(default)]
    pub producer: CommandConfig,

    /// External program that uploads approved videos.
    #[serde(default)]
    pub publisher: CommandConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `shortreel run`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat allowed to review. `0` means no designated admin.
    #[serde(default)]
    pub admin_chat_id: i64,

    /// HTTP timeout applied to every Bot API call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Server-side wait of a `getUpdates` long poll.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u32,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_chat_id: 0,
            request_timeout_secs: default_request_timeout_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    35
}

fn default_poll_timeout_secs() -> u32 {
    30
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding `video_queue.json`, `generation_queue.json`
    /// and `reviewers.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("shortreel"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .into_owned()
}

/// Review flow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApprovalConfig {
    /// Length of the preview clip mentioned in review captions.
    /// Non-positive values fall back to 30 seconds.
    #[serde(default = "default_preview_duration_secs")]
    pub preview_duration_secs: i64,

    /// Maximum number of videos awaiting review.
    #[serde(default = "default_video_queue_capacity")]
    pub video_queue_capacity: usize,

    /// Maximum number of queued generation requests.
    #[serde(default = "default_generation_queue_capacity")]
    pub generation_queue_capacity: usize,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            preview_duration_secs: default_preview_duration_secs(),
            video_queue_capacity: default_video_queue_capacity(),
            generation_queue_capacity: default_generation_queue_capacity(),
        }
    }
}

impl ApprovalConfig {
    pub fn preview_duration(&self) -> Duration {
        if self.preview_duration_secs <= 0 {
            Duration::from_secs(default_preview_duration_secs() as u64)
        } else {
            Duration::from_secs(self.preview_duration_secs as u64)
        }
    }
}

fn default_preview_duration_secs() -> i64 {
    30
}

fn default_video_queue_capacity() -> usize {
    5
}

fn default_generation_queue_capacity() -> usize {
    10
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Tick interval, e.g. `15m`, `90s`, `1h30m`.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Publish autonomous videos without asking a reviewer.
    #[serde(default)]
    pub upload_without_approval: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            upload_without_approval: false,
        }
    }
}

impl SchedulerConfig {
    /// Parsed tick interval.
    pub fn interval(&self) -> Result<Duration, ShortreelError> {
        parse_duration(&self.interval).map_err(|e| {
            ShortreelError::Config(format!("scheduler.interval `{}`: {e}", self.interval))
        })
    }
}

fn default_interval() -> String {
    "15m".to_string()
}

/// An external program invocation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Program followed by its arguments. Empty disables the capability.
    #[serde(default)]
    pub command: Vec<String>,
}

impl CommandConfig {
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}
