//! Traits for the external services the notifier talks to

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::DiscordEmbed;

/// Source of shop data
#[async_trait]
pub trait ShopSource: Send + Sync {
    /// Fetch the current timed deals
    ///
    /// # Returns
    /// * `Option<Value>` - The raw `{"timedDeals": [...]}` response, or `None` if it could not be fetched
    async fn timed_deals(&self) -> Option<Value>;

    /// Fetch the full item catalog
    ///
    /// # Returns
    /// * `Option<Value>` - The raw `{"items": [...]}` response, or `None` if it could not be fetched
    async fn catalog(&self) -> Option<Value>;
}

/// Maps an item identifier to a preview image on disk
pub trait AssetResolver: Send + Sync {
    /// # Returns
    /// * `Option<PathBuf>` - Path of the preview image, or `None` if there is none
    fn resolve(&self, item_id: &str) -> Option<PathBuf>;
}

/// Publishes a local image and hands back its public URL
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload the image at `path` under the display name `name`
    ///
    /// # Returns
    /// * `Option<String>` - The hosted image URL, or `None` if the upload failed
    async fn upload(&self, path: &Path, name: &str) -> Option<String>;
}

/// Posts finished embeds to their destination
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Send `message_text` followed by `blocks`
    ///
    /// # Returns
    /// * `bool` - `true` only if every outbound message was accepted
    async fn deliver(&self, message_text: &str, blocks: &[DiscordEmbed], username: &str) -> bool;
}
