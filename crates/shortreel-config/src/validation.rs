// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-zero capacities, parseable intervals, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::duration::parse_duration;
use crate::model::{CommandConfig, ShortreelConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ShortreelConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        invalid(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        invalid("telegram.bot_token must not be empty when set".to_string());
    }

    if config.telegram.request_timeout_secs == 0 {
        invalid("telegram.request_timeout_secs must be greater than 0".to_string());
    }

    if config.telegram.poll_timeout_secs == 0 {
        invalid("telegram.poll_timeout_secs must be greater than 0".to_string());
    }

    if u64::from(config.telegram.poll_timeout_secs) >= config.telegram.request_timeout_secs {
        invalid(format!(
            "telegram.poll_timeout_secs ({}) must be shorter than telegram.request_timeout_secs ({})",
            config.telegram.poll_timeout_secs, config.telegram.request_timeout_secs
        ));
    }

    if config.storage.data_dir.trim().is_empty() {
        invalid("storage.data_dir must not be empty".to_string());
    }

    if config.approval.video_queue_capacity == 0 {
        invalid("approval.video_queue_capacity must be at least 1".to_string());
    }

    if config.approval.generation_queue_capacity == 0 {
        invalid("approval.generation_queue_capacity must be at least 1".to_string());
    }

    match parse_duration(&config.scheduler.interval) {
        Ok(d) if d.is_zero() => invalid("scheduler.interval must be greater than 0".to_string()),
        Ok(_) => {}
        Err(e) => invalid(format!(
            "scheduler.interval `{}` is invalid: {e}",
            config.scheduler.interval
        )),
    }

    for (section, command) in [("producer", &config.producer), ("publisher", &config.publisher)] {
        if let Some(message) = check_command(section, command) {
            invalid(message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_command(section: &str, command: &CommandConfig) -> Option<String> {
    let program = command.command.first()?;
    if program.trim().is_empty() {
        Some(format!("{section}.command must start with a program name"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ShortreelConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_capacities_fail_validation() {
        let mut config = ShortreelConfig::default();
        config.approval.video_queue_capacity = 0;
        config.approval.generation_queue_capacity = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "video_queue_capacity"));
        assert!(has_error(&errors, "generation_queue_capacity"));
    }

    #[test]
    fn bad_interval_fails_validation() {
        let mut config = ShortreelConfig::default();
        config.scheduler.interval = "soon".to_string();
        assert!(has_error(&validate_config(&config).unwrap_err(), "scheduler.interval"));

        config.scheduler.interval = "0m".to_string();
        assert!(has_error(&validate_config(&config).unwrap_err(), "greater than 0"));
    }

    #[test]
    fn empty_data_dir_fails_validation() {
        let mut config = ShortreelConfig::default();
        config.storage.data_dir = "  ".to_string();
        assert!(has_error(&validate_config(&config).unwrap_err(), "storage.data_dir"));
    }

    #[test]
    fn poll_timeout_must_fit_inside_request_timeout() {
        let mut config = ShortreelConfig::default();
        config.telegram.poll_timeout_secs = 40;
        assert!(has_error(&validate_config(&config).unwrap_err(), "poll_timeout_secs"));
    }

    #[test]
    fn blank_command_program_fails_validation() {
        let mut config = ShortreelConfig::default();
        config.producer.command = vec![" ".to_string(), "--flag".to_string()];
        assert!(has_error(&validate_config(&config).unwrap_err(), "producer.command"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ShortreelConfig::default();
        config.agent.log_level = "loud".to_string();
        config.telegram.bot_token = Some(String::new());
        config.approval.video_queue_capacity = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn command_sections_deserialize_from_toml() {
        let toml_str = r#"
[producer]
command = ["python3", "produce.py"]

[publisher]
command = ["./upload.sh"]
"#;
        let config: ShortreelConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.producer.command, vec!["python3", "produce.py"]);
        assert!(config.publisher.is_configured());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn command_section_denies_unknown_fields() {
        let toml_str = r#"
[producer]
cmd = ["x"]
"#;
        assert!(toml::from_str::<ShortreelConfig>(toml_str).is_err());
    }
}
