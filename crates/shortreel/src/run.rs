// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shortreel run` command implementation.
//!
//! Wires the Telegram transport, the approval service and the scheduler
//! together and runs them until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use shortreel_approval::{ApprovalOptions, ApprovalService};
use shortreel_config::ShortreelConfig;
use shortreel_core::traits::PluginAdapter;
use shortreel_core::types::HealthStatus;
use shortreel_core::ShortreelError;
use shortreel_scheduler::{install_signal_handler, Scheduler};
use shortreel_telegram::TelegramTransport;
use tracing::{info, warn};

use crate::external::{CommandProducer, CommandPublisher};

/// Runs the `shortreel run` command.
///
/// `interval` and `upload` override the `[scheduler]` section.
pub async fn run(
    config: ShortreelConfig,
    interval: Option<Duration>,
    upload: bool,
) -> Result<(), ShortreelError> {
    let interval = match interval {
        Some(interval) => interval,
        None => config.scheduler.interval()?,
    };
    let skip_approval = upload || config.scheduler.upload_without_approval;

    let producer = CommandProducer::from_config(&config.producer)?;
    let publisher = CommandPublisher::from_config(&config.publisher)?;
    let transport = TelegramTransport::new(&config.telegram)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        admin_chat_id = config.telegram.admin_chat_id,
        "starting shortreel"
    );

    match transport.health_check().await {
        Ok(HealthStatus::Healthy) => info!(transport = transport.name(), "transport healthy"),
        Ok(status) => warn!(transport = transport.name(), ?status, "transport degraded"),
        Err(e) => warn!(transport = transport.name(), error = %e, "transport health check failed"),
    }

    let service = Arc::new(ApprovalService::new(
        Arc::new(transport),
        ApprovalOptions::from_config(&config),
    ));
    service.start_bot();

    let cancel = install_signal_handler();
    Scheduler::new(Arc::clone(&service), Arc::new(producer), Arc::new(publisher))
        .with_interval(interval)
        .skip_approval(skip_approval)
        .run(cancel)
        .await;

    service.stop_bot().await;
    info!("shortreel stopped");
    Ok(())
}
