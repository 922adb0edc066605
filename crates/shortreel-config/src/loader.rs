// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./shortreel.toml` > `~/.config/shortreel/shortreel.toml`
//! > `/etc/shortreel/shortreel.toml` with environment variable overrides via the
//! `SHORTREEL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ShortreelConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/shortreel/shortreel.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "shortreel.toml";

/// The user's XDG config file, if a config dir exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shortreel").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shortreel/shortreel.toml` (system-wide)
/// 3. `~/.config/shortreel/shortreel.toml` (user XDG config)
/// 4. `./shortreel.toml` (local directory)
/// 5. `SHORTREEL_*` environment variables
pub fn load_config() -> Result<ShortreelConfig, figment::Error> {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ShortreelConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ShortreelConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShortreelConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShortreelConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShortreelConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SHORTREEL_TELEGRAM_ADMIN_CHAT_ID` must map to
/// `telegram.admin_chat_id`, not `telegram.admin.chat.id`.
fn env_provider() -> Env {
    Env::prefixed("SHORTREEL_").map(|key| {
        // Keys arrive in their original case; figment lowercases them later.
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = [
            "agent", "telegram", "storage", "approval", "scheduler", "producer", "publisher",
        ]
        .iter()
        .find_map(|section| {
            key_str
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(key_str);
        mapped.into()
    })
}
