//! Vitality and difficulty extraction.

use herodex_shared::CharacterStats;
use tracing::debug;

use crate::document::Document;
use crate::selectors::{DIFFICULTY_PANEL, HEALTH_VALUE, IMAGE};

/// Image label counted as one difficulty point.
pub const FULL_STAR_LABEL: &str = "full star";

/// Inclusive bounds of a valid difficulty rating.
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

pub fn extract_stats(doc: &Document) -> CharacterStats {
    CharacterStats {
        health: extract_health(doc),
        difficulty: extract_difficulty(doc),
    }
}

/// Health as a positive base-10 integer; anything else is unknown.
pub fn extract_health(doc: &Document) -> Option<u32> {
    let Some(value) = doc.first(&HEALTH_VALUE) else {
        debug!(field = "health", "health panel not found");
        return None;
    };

    let raw = value.text();
    match raw.parse::<u32>() {
        Ok(health) if health > 0 => Some(health),
        _ => {
            debug!(field = "health", raw = %raw, "health value is not a positive integer");
            None
        }
    }
}

/// Count of full-star images in the difficulty panel, rejected outside 1..=5.
pub fn extract_difficulty(doc: &Document) -> Option<u8> {
    let Some(panel) = doc.first(&DIFFICULTY_PANEL) else {
        debug!(field = "difficulty", "difficulty panel not found");
        return None;
    };

    let stars = panel
        .select(&IMAGE)
        .iter()
        .filter(|img| img.labels().any(|label| label == FULL_STAR_LABEL))
        .count();

    match u8::try_from(stars) {
        Ok(rating) if DIFFICULTY_RANGE.contains(&rating) => Some(rating),
        _ => {
            debug!(field = "difficulty", stars, "difficulty out of range");
            None
        }
    }
}
