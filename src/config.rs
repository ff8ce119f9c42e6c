//! Runtime configuration loaded from the environment

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::assets::DEFAULT_ASSETS_DIR;
use crate::discord::DEFAULT_AVATAR_URL;
use crate::fetch::FetchOptions;
use crate::imgbb::DEFAULT_EXPIRATION_SECS;
use crate::retry::RetryPolicy;
use crate::shop::DEFAULT_API_BASE;

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing webhook makes every delivery fail
    pub webhook_url: Option<String>,
    /// Missing key disables thumbnails
    pub imgbb_api_key: Option<String>,
    pub imgbb_expiration_secs: u64,
    pub shop_api_base: String,
    pub assets_dir: PathBuf,
    pub log_dir: PathBuf,
    pub webhook_username: String,
    pub webhook_avatar_url: String,
    pub run_policy: RetryPolicy,
    pub fetch: FetchOptions,
    /// Cron expression; run once and exit when unset
    pub schedule: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backoff_factor: f64 = parse_or(&get, "BACKOFF_FACTOR", 2.0)?;
        if !backoff_factor.is_finite() || backoff_factor < 0.0 {
            return Err(anyhow!("BACKOFF_FACTOR must be a non-negative number"));
        }

        let run_attempts: u32 = parse_or(&get, "RUN_ATTEMPTS", 3)?;
        let fetch_retries: u32 = parse_or(&get, "FETCH_RETRIES", 3)?;
        if run_attempts == 0 || fetch_retries == 0 {
            return Err(anyhow!("RUN_ATTEMPTS and FETCH_RETRIES must be at least 1"));
        }

        let imgbb_expiration_secs =
            parse_or(&get, "IMGBB_EXPIRATION_SECS", DEFAULT_EXPIRATION_SECS)?;
        let fetch_timeout_secs = parse_or(&get, "FETCH_TIMEOUT_SECS", 10)?;

        Ok(Self {
            webhook_url: get("DISCORD_WEBHOOK_URL"),
            imgbb_api_key: get("IMGBB_API_KEY"),
            imgbb_expiration_secs,
            shop_api_base: get("SHOP_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            assets_dir: get("ASSETS_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR), PathBuf::from),
            log_dir: get("LOG_DIR").map_or_else(|| PathBuf::from("logs"), PathBuf::from),
            webhook_username: get("WEBHOOK_USERNAME")
                .unwrap_or_else(|| "Daily Store Update".to_string()),
            webhook_avatar_url: get("WEBHOOK_AVATAR_URL")
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
            run_policy: RetryPolicy::new(run_attempts, backoff_factor),
            fetch: FetchOptions {
                timeout: Duration::from_secs(fetch_timeout_secs),
                retries: fetch_retries,
                backoff_factor,
            },
            schedule: get("SCHEDULE"),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
