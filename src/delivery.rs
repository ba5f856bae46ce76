// src/delivery.rs

//! Delivery sinks.
//!
//! The chat platform proper lives outside this crate. The poller hands each
//! new notice to a [`NoticeSink`]; the platform layer supplies the transport.
//! Delivery is best-effort: a failed send is logged by the caller and never
//! rolls back the notice record.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Notice;
use crate::utils::truncate_chars;

#[async_trait]
pub trait NoticeSink: Send + Sync {
    async fn deliver(&self, channel_id: &str, notice: &Notice) -> Result<()>;
}

/// Prints each notice to stdout; the CLI's stand-in for a chat channel.
pub struct ConsoleSink {
    preview_chars: usize,
}

impl ConsoleSink {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }
}

#[async_trait]
impl NoticeSink for ConsoleSink {
    async fn deliver(&self, channel_id: &str, notice: &Notice) -> Result<()> {
        println!(
            "[{}] {} ({})\n{}\n{}",
            channel_id,
            notice.title,
            notice.date,
            truncate_chars(&notice.content, self.preview_chars),
            notice.url
        );
        Ok(())
    }
}

/// Posts one JSON payload per notice to the channel's webhook URL.
pub struct WebhookSink {
    client: reqwest::Client,
    webhooks: BTreeMap<String, String>,
    preview_chars: usize,
}

impl WebhookSink {
    pub fn new(
        client: reqwest::Client,
        webhooks: BTreeMap<String, String>,
        preview_chars: usize,
    ) -> Self {
        Self {
            client,
            webhooks,
            preview_chars,
        }
    }
}

#[async_trait]
impl NoticeSink for WebhookSink {
    async fn deliver(&self, channel_id: &str, notice: &Notice) -> Result<()> {
        let Some(url) = self.webhooks.get(channel_id) else {
            return Err(AppError::delivery(channel_id, "no webhook configured"));
        };

        let payload = serde_json::json!({
            "content": format!(
                "{}\n{}\n{}\n{}",
                notice.title,
                notice.date,
                truncate_chars(&notice.content, self.preview_chars),
                notice.url
            ),
        });

        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(AppError::delivery(
                channel_id,
                format!("webhook returned {}", response.status()),
            ));
        }
        Ok(())
    }
}
