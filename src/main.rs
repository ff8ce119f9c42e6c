use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

mod assets;
mod config;
mod discord;
mod embeds;
mod extract;
mod fetch;
mod imgbb;
mod logging;
mod models;
mod rarity;
mod retry;
mod shop;
mod shop_watcher;
#[cfg(test)]
mod test_support;
mod traits;

use assets::LocalAssetResolver;
use config::Config;
use discord::DiscordNotifier;
use embeds::EmbedBuilder;
use fetch::HttpFetcher;
use imgbb::ImgbbUploader;
use logging::LogContext;
use shop::ZombsShopApi;
use shop_watcher::ShopWatcher;
use traits::ImageUploader;

fn build_watcher(config: &Config) -> Result<ShopWatcher> {
    let client = reqwest::Client::new();

    let shop = ZombsShopApi::new(HttpFetcher::new()?, &config.shop_api_base, config.fetch);

    let uploader = config.imgbb_api_key.as_ref().map(|key| {
        Arc::new(ImgbbUploader::new(client.clone(), key, config.imgbb_expiration_secs))
            as Arc<dyn ImageUploader>
    });
    if uploader.is_none() {
        info!("IMGBB_API_KEY not set - embeds will have no thumbnails");
    }
    let resolver = Arc::new(LocalAssetResolver::new(&config.assets_dir));
    let builder = EmbedBuilder::new(resolver, uploader);

    let discord = DiscordNotifier::new(
        client,
        config.webhook_url.clone(),
        &config.webhook_avatar_url,
    );

    Ok(ShopWatcher::new(
        Arc::new(shop),
        builder,
        Arc::new(discord),
        config.run_policy,
        &config.webhook_username,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let logs = LogContext::init(&config.log_dir)?;

    info!("Starting ZombsRoyale shop notifier");
    info!(
        "Logging errors to {} and sent messages to {}",
        logs.error_log.display(),
        logs.sent_log.display()
    );

    let watcher = build_watcher(&config)?;

    // Run once immediately
    let report = watcher.run().await;
    info!(
        "Run finished as {:?} after {} attempt(s), {} embeds sent in {:.2?}",
        report.state, report.attempts, report.blocks_sent, report.elapsed
    );

    let Some(schedule) = config.schedule.clone() else {
        return Ok(());
    };

    let sched = JobScheduler::new().await?;

    let job_watcher = watcher.clone();
    sched
        .add(Job::new_async(schedule.as_str(), move |_uuid, _l| {
            let watcher = job_watcher.clone();
            Box::pin(async move {
                watcher.run().await;
            })
        })?)
        .await?;

    info!("Scheduler started - running on schedule {}", schedule);
    sched.start().await?;

    // Keep the program running
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
    }
}
