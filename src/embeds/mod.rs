//! Turns the shop's timed deals into Discord embeds
//!
//! Each deal becomes one embed. The description lists only the attributes
//! the shop actually returned, in a fixed order:
//!
//! ```text
//! ### Skin #1, Daedalus Wings
//! Type: **`Backpack`**
//! Cost: **`750`** gems
//! itemSku: **`backpack-daedalus-wings`**
//! Rarity: **`Legendary`**
//! Expires: **`2025-09-17`** at **`14:30:00 UTC`**
//! ```
//!
//! A preview thumbnail is attached when the item has a bundled asset and an
//! uploader is configured; otherwise a notice line is appended instead. The
//! first embed carries the author block and the last one the footer.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::models::{
    Deal, DiscordAuthor, DiscordEmbed, DiscordFooter, DiscordThumbnail, deals_from_response,
};
use crate::rarity::{color_for, rarity_of};
use crate::traits::{AssetResolver, ImageUploader};

pub const UNNAMED_DEAL: &str = "Unnamed deal";
pub const NO_PREVIEW_NOTICE: &str = "**There is no image preview available for this skin**";

const AUTHOR_NAME: &str = "Made by: harpoonwithaz";
const AUTHOR_URL: &str = "https://github.com/harpoonwithaz";
const AUTHOR_ICON_URL: &str = "https://github.com/harpoonwithaz.png";
const FOOTER_TEXT: &str = "Made using zombsroyale.io API";
const FOOTER_ICON_URL: &str =
    "https://bracketfights.com/images/hero/2019/zombsroyale-afro-tournament-9827/1603079365.png";

#[derive(Clone)]
pub struct EmbedBuilder {
    resolver: Arc<dyn AssetResolver>,
    /// `None` when no upload credential is configured
    uploader: Option<Arc<dyn ImageUploader>>,
}

impl EmbedBuilder {
    pub fn new(resolver: Arc<dyn AssetResolver>, uploader: Option<Arc<dyn ImageUploader>>) -> Self {
        Self { resolver, uploader }
    }

    /// Build one embed per deal in `deals_response`, preserving order.
    ///
    /// A response without a `timedDeals` list yields no embeds.
    pub async fn build_blocks(
        &self,
        deals_response: &Value,
        catalog_response: Option<&Value>,
    ) -> Vec<DiscordEmbed> {
        let deals = deals_from_response(deals_response).unwrap_or_default();
        let last = deals.len().saturating_sub(1);

        let mut blocks = Vec::with_capacity(deals.len());
        for (index, deal) in deals.iter().enumerate() {
            let mut block = self.build_block(index + 1, deal, catalog_response).await;

            if index == 0 {
                block.author = Some(DiscordAuthor {
                    name: AUTHOR_NAME.to_string(),
                    url: AUTHOR_URL.to_string(),
                    icon_url: AUTHOR_ICON_URL.to_string(),
                });
            }
            if index == last {
                block.footer = Some(DiscordFooter {
                    text: FOOTER_TEXT.to_string(),
                    icon_url: FOOTER_ICON_URL.to_string(),
                });
            }

            blocks.push(block);
        }

        info!("Built {} embeds", blocks.len());
        blocks
    }

    async fn build_block(
        &self,
        number: usize,
        deal: &Deal,
        catalog: Option<&Value>,
    ) -> DiscordEmbed {
        let rarity = deal
            .item_id
            .as_deref()
            .and_then(|id| rarity_of(catalog, id));

        let mut lines = vec![format!(
            "### Skin #{}, {}",
            number,
            deal.name.as_deref().unwrap_or(UNNAMED_DEAL)
        )];
        if let Some(kind) = deal.kind() {
            lines.push(format!("Type: **`{kind}`**"));
        }
        if let Some(cost) = &deal.cost {
            let line = format!("Cost: **`{}`** {}", cost.amount, cost.currency.label());
            lines.push(line.trim_end().to_string());
        }
        if let Some(id) = &deal.item_id {
            lines.push(format!("itemSku: **`{id}`**"));
        }
        if let Some(rarity) = &rarity {
            lines.push(format!("Rarity: **`{rarity}`**"));
        }
        if let Some(expiry) = &deal.expiry {
            lines.push(expiry.display_line());
        }

        let thumbnail = match &deal.item_id {
            Some(id) => self.thumbnail_for(id).await,
            None => None,
        };
        if thumbnail.is_none() {
            lines.push(NO_PREVIEW_NOTICE.to_string());
        }

        DiscordEmbed {
            description: lines.join("\n"),
            color: color_for(rarity.as_deref()),
            thumbnail,
            author: None,
            footer: None,
        }
    }

    async fn thumbnail_for(&self, item_id: &str) -> Option<DiscordThumbnail> {
        let uploader = self.uploader.as_ref()?;
        let Some(path) = self.resolver.resolve(item_id) else {
            debug!("No preview asset for {}", item_id);
            return None;
        };

        let url = uploader.upload(&path, item_id).await?;
        Some(DiscordThumbnail { url })
    }
}
