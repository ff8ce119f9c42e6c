//! Item rarity lookup and embed colors

use serde_json::Value;

/// Embed color for deals whose rarity is unknown
pub const DEFAULT_COLOR: u32 = 197_379;

/// Rarities that get a dedicated embed color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Mythic,
    Legendary,
    Epic,
    Rare,
}

impl Rarity {
    /// Exact, case-sensitive match on the catalog's rarity name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Mythic" => Some(Self::Mythic),
            "Legendary" => Some(Self::Legendary),
            "Epic" => Some(Self::Epic),
            "Rare" => Some(Self::Rare),
            _ => None,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            Self::Mythic => 15_028_046,
            Self::Legendary => 16_549_180,
            Self::Epic => 9_264_577,
            Self::Rare => 3_653_105,
        }
    }
}

/// Map an optional rarity name to an embed color
pub fn color_for(rarity: Option<&str>) -> u32 {
    rarity
        .and_then(Rarity::from_name)
        .map_or(DEFAULT_COLOR, Rarity::color)
}

/// Find the rarity of `item_id` in the item catalog.
///
/// The first catalog entry whose `sku` matches decides; it yields `None` if
/// that entry has no rarity.
pub fn rarity_of(catalog: Option<&Value>, item_id: &str) -> Option<String> {
    catalog?
        .get("items")
        .and_then(Value::as_array)?
        .iter()
        .find(|item| item.get("sku").and_then(Value::as_str) == Some(item_id))
        .and_then(|item| item.get("rarity"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
