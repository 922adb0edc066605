// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shortreel once` command implementation.

use shortreel_config::ShortreelConfig;
use shortreel_core::traits::{Producer, Publisher};
use shortreel_core::types::QueuedVideo;
use shortreel_core::ShortreelError;
use shortreel_scheduler::install_signal_handler;
use tracing::info;

use crate::external::{CommandProducer, CommandPublisher};
use crate::OnceArgs;

/// Produces one video, prints it, and publishes it when asked.
pub async fn once(config: ShortreelConfig, args: OnceArgs) -> Result<(), ShortreelError> {
    let producer = CommandProducer::from_config(&config.producer)?;
    let publisher = if args.upload {
        Some(CommandPublisher::from_config(&config.publisher)?)
    } else {
        None
    };
    let cancel = install_signal_handler();

    let produce = async {
        match args.topic.as_deref() {
            Some(topic) if !args.reddit => {
                info!(topic, "generating video");
                producer.generate(topic).await
            }
            _ => {
                info!("generating video on a trending topic");
                producer.generate_autonomous().await
            }
        }
    };
    let video = tokio::select! {
        _ = cancel.cancelled() => return Err(ShortreelError::Cancelled),
        video = produce => video?,
    };
    print_video(&video);

    if let Some(publisher) = publisher {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(ShortreelError::Cancelled),
            outcome = publisher.publish(&video) => outcome?,
        };
        println!("uploaded: {}", outcome.url);
    }

    cancel.cancel();
    Ok(())
}

fn print_video(video: &QueuedVideo) {
    println!("title:   {}", video.title);
    println!("video:   {}", video.video_path.display());
    if let Some(preview) = &video.preview_path {
        println!("preview: {}", preview.display());
    }
    if !video.tags.is_empty() {
        println!("tags:    {}", video.tags.join(", "));
    }
}
