//! # Discord Webhook Integration
//!
//! This module delivers the shop summary and its embeds to a Discord
//! webhook.
//!
//! ## Message Layout
//!
//! Discord accepts at most 10 embeds per webhook message, so the embeds are
//! split into consecutive chunks of 10. Each chunk becomes one message:
//! - **First message**: the run's summary text plus the first 10 embeds
//! - **Later messages**: empty text plus the next 10 embeds
//! - **Every message**: the same username and avatar
//!
//! With no embeds at all a single text-only message is sent.
//!
//! ## Failure Semantics
//!
//! - **Missing webhook URL**: logged as an error, delivery fails
//! - **Rejected message** (non-2xx): status and body are logged, the
//!   remaining chunks are still sent, delivery fails
//! - **Transport error**: logged, delivery stops and fails immediately
//!
//! ## Environment Configuration
//!
//! Set `DISCORD_WEBHOOK_URL` with your webhook URL.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, warn};

use crate::models::{DiscordEmbed, DiscordMessage};
use crate::traits::Delivery;

/// Discord's limit on embeds per webhook message
pub const MAX_EMBEDS_PER_MESSAGE: usize = 10;

/// Default avatar shown next to webhook messages
pub const DEFAULT_AVATAR_URL: &str = "https://raw.githubusercontent.com/harpoonwithaz/zr_store_checker_webhook/refs/heads/main/assets/webhook_logo.png";

/// Discord webhook client for shop notifications.
///
/// ## Fields
///
/// - `client`: Reusable HTTP client for webhook requests
/// - `webhook_url`: Webhook URL from configuration; `None` makes every
///   delivery fail
/// - `avatar_url`: Avatar attached to every message
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
    avatar_url: String,
}

impl DiscordNotifier {
    /// Creates a notifier posting to `webhook_url`.
    ///
    /// A missing URL is accepted here and only logged; it turns into a
    /// failed delivery when something is actually sent.
    pub fn new(client: Client, webhook_url: Option<String>, avatar_url: impl Into<String>) -> Self {
        if webhook_url.is_none() {
            warn!("DISCORD_WEBHOOK_URL not set - deliveries will fail");
        }

        Self {
            client,
            webhook_url,
            avatar_url: avatar_url.into(),
        }
    }

    /// Build the outbound messages for one delivery.
    ///
    /// Only the first message carries `message_text`.
    pub fn batch(
        &self,
        message_text: &str,
        blocks: &[DiscordEmbed],
        username: &str,
    ) -> Vec<DiscordMessage> {
        let message = |content: &str, embeds: &[DiscordEmbed]| DiscordMessage {
            content: content.to_string(),
            username: username.to_string(),
            avatar_url: self.avatar_url.clone(),
            embeds: embeds.to_vec(),
        };

        if blocks.is_empty() {
            return vec![message(message_text, &[])];
        }

        blocks
            .chunks(MAX_EMBEDS_PER_MESSAGE)
            .enumerate()
            .map(|(index, chunk)| message(if index == 0 { message_text } else { "" }, chunk))
            .collect()
    }
}

#[async_trait]
impl Delivery for DiscordNotifier {
    /// Sends every chunk of `blocks` to the webhook.
    ///
    /// ## Return Value
    ///
    /// Returns `true` only if every message was accepted by Discord.
    async fn deliver(&self, message_text: &str, blocks: &[DiscordEmbed], username: &str) -> bool {
        let Some(webhook_url) = &self.webhook_url else {
            error!("No webhook URL configured - cannot deliver {} embeds", blocks.len());
            return false;
        };

        let messages = self.batch(message_text, blocks, username);
        let total = messages.len();
        let mut all_sent = true;

        for (index, message) in messages.iter().enumerate() {
            let response = match self.client.post(webhook_url).json(message).send().await {
                Ok(response) => response,
                Err(e) => {
                    error!("Failed to send Discord message {}/{}: {}", index + 1, total, e);
                    return false;
                }
            };

            let status = response.status();
            if status.is_success() {
                info!(
                    "Discord message {}/{} sent with {} embeds",
                    index + 1,
                    total,
                    message.embeds.len()
                );
            } else {
                let body = response.text().await.unwrap_or_default();
                error!(
                    "Discord rejected message {}/{}: {} - {}",
                    index + 1,
                    total,
                    status,
                    body
                );
                all_sent = false;
            }
        }

        all_sent
    }
}
