mod error;


pub use error::DeliveryError;

use crate::config::Config;
use crate::splitter::Splitter;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The chat channel a reply is delivered to
#[async_trait]
pub trait ReplyTarget: Send {
    /// Send `text` as a reply to the triggering message
    async fn reply(&mut self, text: &str) -> Result<(), BoxError>;

    /// Send `text` as a plain message in the same channel
    async fn send(&mut self, text: &str) -> Result<(), BoxError>;
}

/// Pacing and fallback settings for multi-part replies
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    /// Pause before each message after the first
    pub send_interval: Duration,
    /// Sent as a reply when a part fails; empty disables it
    pub failure_notice: String,
}

impl DeliveryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            send_interval: config.send_interval(),
            failure_notice: config.failure_notice.clone(),
        }
    }
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of a completed delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub chunks_sent: usize,
    pub total_chunks: usize,
    /// Whether the text had to be split at all
    pub split: bool,
}

/// Deliver a complete reply, splitting it when it exceeds the ceiling
///
/// The first part is sent as a reply and later parts as channel messages,
/// paced by `send_interval`. On the first failed part a failure notice is
/// attempted and the error is returned.
pub async fn deliver_reply<T>(
    target: &mut T,
    text: &str,
    splitter: &Splitter,
    options: &DeliveryOptions,
) -> Result<DeliveryReport, DeliveryError>
where
    T: ReplyTarget + ?Sized,
{
    if text.trim().is_empty() {
        debug!("empty reply, nothing to send");
        return Ok(DeliveryReport {
            chunks_sent: 0,
            total_chunks: 0,
            split: false,
        });
    }

    if splitter.fits(text) {
        target
            .reply(text)
            .await
            .map_err(|source| DeliveryError::Send {
                index: 0,
                total: 1,
                source,
            })?;
        return Ok(DeliveryReport {
            chunks_sent: 1,
            total_chunks: 1,
            split: false,
        });
    }

    let chunks = splitter.split(text);
    let total = chunks.len();
    info!(chunks = total, "long reply, sending in parts");

    for (index, chunk) in chunks.iter().enumerate() {
        let result = if index == 0 {
            target.reply(chunk).await
        } else {
            if !options.send_interval.is_zero() {
                tokio::time::sleep(options.send_interval).await;
            }
            target.send(chunk).await
        };

        if let Err(source) = result {
            error!(part = index + 1, total, error = %source, "failed to send reply part");
            send_failure_notice(target, &options.failure_notice).await;
            return Err(DeliveryError::Send {
                index,
                total,
                source,
            });
        }

        debug!(part = index + 1, total, "sent reply part");
    }

    info!(chunks = total, "long reply complete");
    Ok(DeliveryReport {
        chunks_sent: total,
        total_chunks: total,
        split: true,
    })
}

async fn send_failure_notice<T>(target: &mut T, notice: &str)
where
    T: ReplyTarget + ?Sized,
{
    if notice.is_empty() {
        return;
    }
    if let Err(e) = target.reply(notice).await {
        error!(error = %e, "failed to send failure notice");
    }
}
