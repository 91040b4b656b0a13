//! Core domain types for herodex records.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::HerodexError;

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// A character known to the store, as discovered by the roster pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterIdentity {
    /// Stable external key (slug of the display name).
    pub id: String,
    /// Display name, used to build the character page URL.
    pub name: String,
    /// Coarse role/type string.
    pub category: String,
    /// Portrait image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Numeric stats of a character. `None` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    /// Vitality, always positive when known.
    pub health: Option<u32>,
    /// Difficulty rating, always within 1..=5 when known.
    pub difficulty: Option<u8>,
}

/// Everything the lore pass derives for one character. Written wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub character_id: String,
    pub stats: CharacterStats,
    /// Normalized biography, paragraphs separated by a blank line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,
}

// ---------------------------------------------------------------------------
// Abilities
// ---------------------------------------------------------------------------

/// One ability of a character page.
///
/// The owning character is supplied by the caller when the ability is
/// written; upsert identity is `(character_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// Title-cased ability name.
    pub name: String,
    /// Canonical input-binding token (e.g. `Left Mouse Button`, `Q`).
    #[serde(rename = "type")]
    pub slot: String,
    /// Flavor text, may be empty.
    #[serde(default)]
    pub description: String,
    /// Canonical key → raw value text, in source order.
    #[serde(default)]
    pub stats: IndexMap<String, String>,
}

impl Ability {
    /// Start an ability with empty description and stats.
    pub fn new(name: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: slot.into(),
            description: String::new(),
            stats: IndexMap::new(),
        }
    }

    /// An ability is only valid with both a name and a slot.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.slot.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// Category of a news feed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    Announcement,
    Update,
    DevDiary,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::Update => "update",
            Self::DevDiary => "dev_diary",
        }
    }
}

impl std::fmt::Display for FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedType {
    type Err = HerodexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "announcement" => Ok(Self::Announcement),
            "update" => Ok(Self::Update),
            "dev_diary" => Ok(Self::DevDiary),
            other => Err(HerodexError::validation(format!(
                "unknown feed type '{other}': expected announcement, update, or dev_diary"
            ))),
        }
    }
}

/// A news-feed item, upserted by `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Natural key.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub feed_type: FeedType,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Constant tenant key.
    pub game_id: String,
}

// ---------------------------------------------------------------------------
// PassKind
// ---------------------------------------------------------------------------

/// The four ingestion passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    News,
    Roster,
    Lore,
    Abilities,
}

impl PassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Roster => "roster",
            Self::Lore => "lore",
            Self::Abilities => "abilities",
        }
    }
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
