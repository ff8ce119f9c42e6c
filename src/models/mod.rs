//! Data models for shop deals and Discord webhook payloads

use serde::Serialize;
use serde_json::Value;

use crate::extract::{first_present, value_as_text};

/// Candidate keys for a reward's item identifier, in preference order
pub const ITEM_ID_KEYS: &[&str] = &["itemSku", "packSku"];

/// Candidate keys for a deal's price, in preference order
pub const COST_KEYS: &[&str] = &["cost_gems", "cost_coins"];

/// Currency a deal is priced in, derived from whichever cost key was present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Gems,
    Coins,
    Unknown,
}

impl Currency {
    fn from_key(key: &str) -> Self {
        match key {
            "cost_gems" => Self::Gems,
            "cost_coins" => Self::Coins,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gems => "gems",
            Self::Coins => "coins",
            Self::Unknown => "",
        }
    }
}

/// Price of a deal as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cost {
    pub amount: String,
    pub currency: Currency,
}

/// When a deal leaves the shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    pub date: String,
    pub time: Option<String>,
    pub timezone: Option<String>,
}

impl Expiry {
    /// Split a raw `"2025-09-17 14:30:00.123"` style timestamp into its parts.
    ///
    /// Without a space the whole string is the date. Anything after the first
    /// `.` in the time part is dropped.
    pub fn parse(raw: &str, timezone: Option<&str>) -> Self {
        let (date, time) = match raw.split_once(' ') {
            Some((date, time)) => {
                let time = time.split('.').next().unwrap_or(time);
                (date, Some(time.to_string()))
            }
            None => (raw, None),
        };

        Self {
            date: date.to_string(),
            time,
            timezone: timezone.map(str::to_string),
        }
    }

    /// Render the `Expires:` body line
    pub fn display_line(&self) -> String {
        match (&self.time, &self.timezone) {
            (Some(time), Some(tz)) => {
                format!("Expires: **`{}`** at **`{time} {tz}`**", self.date)
            }
            (Some(time), None) => format!("Expires: **`{}`** at **`{time}`**", self.date),
            (None, _) => format!("Expires: **`{}`**", self.date),
        }
    }
}

/// A single time-limited shop offer, read defensively from the shop API.
///
/// Every field is optional: a missing key never fails parsing, it only drops
/// the corresponding attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deal {
    pub name: Option<String>,
    pub item_id: Option<String>,
    pub cost: Option<Cost>,
    pub expiry: Option<Expiry>,
}

impl Deal {
    pub fn from_value(raw: &Value) -> Self {
        let name = raw.get("name").and_then(Value::as_str).map(str::to_string);

        // Only the first reward identifies the deal
        let item_id = raw
            .get("rewards")
            .and_then(Value::as_array)
            .and_then(|rewards| rewards.first())
            .and_then(|reward| first_present(reward, ITEM_ID_KEYS))
            .and_then(|(_, value)| value.as_str())
            .map(str::to_string);

        let cost = first_present(raw, COST_KEYS).and_then(|(key, value)| {
            value_as_text(value).map(|amount| Cost {
                amount,
                currency: Currency::from_key(key),
            })
        });

        let expiry = raw.get("expires").and_then(|expires| {
            let date = expires.get("date").and_then(Value::as_str)?;
            let timezone = expires.get("timezone").and_then(Value::as_str);
            Some(Expiry::parse(date, timezone))
        });

        Self {
            name,
            item_id,
            cost,
            expiry,
        }
    }

    /// Item category, e.g. `Backpack` for `backpack-daedalus-wings`
    pub fn kind(&self) -> Option<String> {
        let id = self.item_id.as_deref()?;
        let head = id.split('-').next().unwrap_or(id);
        Some(capitalize(head))
    }
}

/// Upper-case the first character and lower-case the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Read the `timedDeals` list out of a shop response
pub fn deals_from_response(response: &Value) -> Option<Vec<Deal>> {
    response
        .get("timedDeals")
        .and_then(Value::as_array)
        .map(|deals| deals.iter().map(Deal::from_value).collect())
}

/// Discord embed structure for rich notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscordEmbed {
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<DiscordThumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<DiscordAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<DiscordFooter>,
}

/// Small thumbnail image for Discord embeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscordThumbnail {
    pub url: String,
}

/// Author line shown above the first embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscordAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

/// Footer shown under the last embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscordFooter {
    pub text: String,
    pub icon_url: String,
}

/// Discord webhook message payload
#[derive(Debug, Serialize)]
pub struct DiscordMessage {
    pub content: String,
    pub username: String,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<DiscordEmbed>,
}
