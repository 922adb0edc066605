// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shortreel - a human-in-the-loop control plane for short-form video.
//!
//! This is the binary entry point: `run` for the scheduler with the chat
//! approval bot, `once` for a single generation without chat.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod external;
mod once;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use shortreel_config::{ConfigError, ShortreelConfig};
use shortreel_core::ShortreelError;
use tracing::error;

/// Exit code for producer, publisher and runtime failures.
const EXIT_FAILURE: u8 = 1;
/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 2;

/// Shortreel - generate short videos, review them in chat, publish them.
#[derive(Parser, Debug)]
#[command(name = "shortreel", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler and the chat approval bot until interrupted.
    Run {
        /// Time between scheduled generations, e.g. `15m`, `90s`, `1h`.
        #[arg(long, value_parser = shortreel_config::parse_duration)]
        interval: Option<Duration>,

        /// Publish scheduled videos without waiting for approval.
        #[arg(long)]
        upload: bool,
    },
    /// Generate a single video and exit.
    Once(OnceArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["topic", "reddit"])))]
struct OnceArgs {
    /// Topic of the video.
    #[arg(long)]
    topic: Option<String>,

    /// Let the producer pick a trending topic.
    #[arg(long, visible_alias = "autonomous")]
    reddit: bool,

    /// Publish the video once it is produced.
    #[arg(long)]
    upload: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            shortreel_config::render_errors(&errors);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Run { interval, upload } => run::run(config, interval, upload).await,
        Commands::Once(args) => once::once(config, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "shortreel failed");
            eprintln!("error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ShortreelConfig, Vec<ConfigError>> {
    match path {
        Some(path) => shortreel_config::load_and_validate_path(path),
        None => shortreel_config::load_and_validate(),
    }
}

fn exit_code(error: &ShortreelError) -> u8 {
    match error {
        ShortreelError::Config(_) => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shortreel={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_interval_and_upload() {
        let cli = Cli::try_parse_from(["shortreel", "run", "--interval", "30m", "--upload"]).unwrap();
        match cli.command {
            Commands::Run { interval, upload } => {
                assert_eq!(interval, Some(Duration::from_secs(1800)));
                assert!(upload);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_rejects_bad_interval() {
        assert!(Cli::try_parse_from(["shortreel", "run", "--interval", "soon"]).is_err());
    }

    #[test]
    fn once_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["shortreel", "once"]).is_err());
        assert!(Cli::try_parse_from(["shortreel", "once", "--topic", "t", "--reddit"]).is_err());

        let cli = Cli::try_parse_from(["shortreel", "once", "--autonomous", "--upload"]).unwrap();
        match cli.command {
            Commands::Once(args) => {
                assert!(args.reddit);
                assert!(args.upload);
                assert!(args.topic.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["shortreel", "once", "--topic", "cats", "--config", "/tmp/s.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn config_errors_exit_with_two() {
        assert_eq!(exit_code(&ShortreelError::Config("x".into())), EXIT_CONFIG);
        assert_eq!(
            exit_code(&ShortreelError::Producer {
                message: "x".into(),
                source: None
            }),
            EXIT_FAILURE
        );
    }
}
