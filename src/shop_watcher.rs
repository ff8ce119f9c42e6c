use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::Local;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::embeds::EmbedBuilder;
use crate::logging::SENT_TARGET;
use crate::retry::RetryPolicy;
use crate::traits::{Delivery, ShopSource};

/// Where a run currently is.
///
/// The intermediate states are only reported through `debug!` as the
/// pipeline moves on; a [`RunReport`] always holds `Succeeded` or
/// `FailedFinal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Fetching,
    Building,
    Delivering,
    Succeeded,
    FailedRetrying,
    FailedFinal,
}

/// Outcome of one [`ShopWatcher::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// `Succeeded` or `FailedFinal`
    pub state: RunState,
    pub attempts: u32,
    /// Embeds delivered; zero unless the run succeeded
    pub blocks_sent: usize,
    pub elapsed: Duration,
}

/// Fetches the shop, builds the embeds and delivers them, retrying the
/// whole pipeline on failure.
#[derive(Clone)]
pub struct ShopWatcher {
    source: Arc<dyn ShopSource>,
    builder: EmbedBuilder,
    delivery: Arc<dyn Delivery>,
    policy: RetryPolicy,
    username: String,
}

impl ShopWatcher {
    pub fn new(
        source: Arc<dyn ShopSource>,
        builder: EmbedBuilder,
        delivery: Arc<dyn Delivery>,
        policy: RetryPolicy,
        username: impl Into<String>,
    ) -> Self {
        Self {
            source,
            builder,
            delivery,
            policy,
            username: username.into(),
        }
    }

    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        let attempts = self.policy.attempts.max(1);
        let mut used = 0;

        let outcome = self
            .policy
            .run(
                "Shop update",
                |attempt| {
                    used = attempt;
                    self.attempt(attempt, attempts)
                },
                |_| true,
            )
            .await;

        let (state, blocks_sent) = match outcome {
            Ok(blocks) => (RunState::Succeeded, blocks),
            Err(e) => {
                error!("Giving up after {} attempts: {:#}", used, e);
                (RunState::FailedFinal, 0)
            }
        };
        debug!("Run finished in state {:?}", state);

        let elapsed = started.elapsed();
        info!("Execution time: {:.4} seconds", elapsed.as_secs_f64());

        RunReport {
            state,
            attempts: used,
            blocks_sent,
            elapsed,
        }
    }

    /// One pass through the pipeline; returns the number of embeds sent
    async fn attempt(&self, attempt: u32, attempts: u32) -> Result<usize> {
        match self.pipeline().await {
            Ok(sent) => Ok(sent),
            Err(e) => {
                error!("Attempt {}/{} failed: {:?}", attempt, attempts, e);
                if attempt < attempts {
                    debug!("State -> {:?}", RunState::FailedRetrying);
                }
                Err(e)
            }
        }
    }

    async fn pipeline(&self) -> Result<usize> {
        debug!("State -> {:?}", RunState::Fetching);
        let deals = self
            .source
            .timed_deals()
            .await
            .ok_or_else(|| anyhow!("No timed deals data received from the shop API"))?;
        let catalog = self
            .source
            .catalog()
            .await
            .ok_or_else(|| anyhow!("No item catalog data received from the shop API"))?;
        if deals.get("timedDeals").and_then(|d| d.as_array()).is_none() {
            return Err(anyhow!("Shop response does not contain a timedDeals list"));
        }

        debug!("State -> {:?}", RunState::Building);
        let blocks = self.builder.build_blocks(&deals, Some(&catalog)).await;

        debug!("State -> {:?}", RunState::Delivering);
        let message = summary_message(&Local::now());
        if !self.delivery.deliver(&message, &blocks, &self.username).await {
            return Err(anyhow!("Delivery of {} embeds failed", blocks.len()));
        }

        info!(
            target: SENT_TARGET,
            "{} | {} embeds | {}",
            Local::now().to_rfc3339(),
            blocks.len(),
            message
        );
        info!("Message successfully sent with {} embeds", blocks.len());
        Ok(blocks.len())
    }
}

/// Text posted above the embeds
pub fn summary_message(now: &chrono::DateTime<Local>) -> String {
    format!(
        "@everyone\n# ZombsRoyale daily vaulted goods\nFor **`{}`** at **`{}`**",
        now.format("%x"),
        now.format("%X")
    )
}
