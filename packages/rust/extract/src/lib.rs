//! Page extraction for character wiki pages and news articles.
//!
//! Every function here is pure: it takes a parsed [`Document`] and returns
//! plain records from `herodex-shared`. Fetching and persistence live in
//! `herodex-core` and `herodex-storage`.

pub mod abilities;
pub mod classify;
pub mod document;
pub mod lore;
pub mod news;
pub mod normalize;
pub mod roster;
mod selectors;
pub mod stats;

pub use abilities::{AbilityExtraction, extract_abilities};
pub use classify::{Layout, LayoutKind, classify};
pub use document::{Document, Node, Query};
pub use lore::{BIOGRAPHY_MARKER, LoreOutcome, extract_lore};
pub use news::{NewsPage, extract_news};
pub use roster::extract_roster;
pub use stats::{extract_difficulty, extract_health, extract_stats};

#[cfg(test)]
mod fixture_tests {
    use super::*;
    use url::Url;

    fn fixture(name: &str) -> Document {
        let path = format!("{}/../../../fixtures/html/{name}", env!("CARGO_MANIFEST_DIR"));
        let markup = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{path}: {e}"));
        Document::parse(&markup)
    }

    #[test]
    fn current_format_page() {
        let doc = fixture("current.html");

        assert_eq!(classify(&doc).kind(), LayoutKind::Current);
        let stats = extract_stats(&doc);
        assert_eq!(stats.health, Some(250));
        assert_eq!(stats.difficulty, Some(4));

        assert_eq!(
            extract_lore(&doc).into_lore().as_deref(),
            Some("Peter Parker was bitten by a radioactive spider.\n\n\n\nNow he swings through the city.")
        );

        let extraction = extract_abilities(&doc);
        assert_eq!(extraction.layout, LayoutKind::Current);
        let names: Vec<_> = extraction.abilities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["Web Strike", "Spectacular Spin", "Get Over Here!", "Mystery Move"]
        );
        assert_eq!(extraction.incomplete().count(), 1);
        assert_eq!(
            extraction.abilities[3].stats.get("damage").map(String::as_str),
            Some("99")
        );

        let strike = &extraction.abilities[0];
        assert_eq!(strike.slot, "Left Mouse Button");
        assert_eq!(strike.description, "Shoot a web that deals damage.");
        assert_eq!(strike.stats.get("cooldown").map(String::as_str), Some("6s"));
        assert_eq!(strike.stats.get("damage").map(String::as_str), Some("45"));
        assert_eq!(strike.stats.get("range").map(String::as_str), Some("20m"));

        let spin = &extraction.abilities[1];
        assert_eq!(spin.slot, "Q");
        assert_eq!(spin.stats.get("energy_cost").map(String::as_str), Some("100"));
        assert_eq!(
            spin.stats.get("projectile_speed").map(String::as_str),
            Some("Instant")
        );

        assert_eq!(extraction.abilities[2].slot, "Right Mouse Button");
    }

    #[test]
    fn legacy_format_page() {
        let doc = fixture("legacy.html");

        assert_eq!(classify(&doc).kind(), LayoutKind::Legacy);
        assert_eq!(extract_stats(&doc), herodex_shared::CharacterStats::default());
        assert_eq!(extract_lore(&doc), LoreOutcome::MarkerMissing);

        let extraction = extract_abilities(&doc);
        assert_eq!(extraction.layout, LayoutKind::Legacy);
        assert_eq!(extraction.abilities.len(), 5);
        assert_eq!(extraction.incomplete().count(), 1);
        let slots: Vec<_> = extraction
            .abilities
            .iter()
            .filter(|a| a.is_complete())
            .map(|a| (a.name.as_str(), a.slot.as_str()))
            .collect();
        assert_eq!(
            slots,
            [
                ("Mjolnir Bash", "Left Mouse Button"),
                ("Lightning Realm", "Left Shift"),
                ("Worthy", "Passive"),
                ("Storm Surge", "C"),
            ]
        );

        let bash = &extraction.abilities[0];
        assert_eq!(bash.stats.get("cooldownTime").map(String::as_str), Some("0.5s"));
        assert_eq!(bash.stats.get("damage").map(String::as_str), Some("70"));
        assert_eq!(bash.stats.get("properties").map(String::as_str), Some("Melee"));
        assert_eq!(
            extraction.abilities[1].stats.get("energyCost").map(String::as_str),
            Some("None")
        );
    }

    #[test]
    fn roster_page() {
        let doc = fixture("roster.html");
        let page = Url::parse("https://heroes.fandom.com/wiki/Heroes").unwrap();
        let roster = extract_roster(&doc, &page);
        let ids: Vec<_> = roster.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["hela", "spider-man", "rocket-raccoon"]);
        assert_eq!(
            roster[0].image_url.as_deref(),
            Some("https://heroes.fandom.com/images/hela.png")
        );
    }

    #[test]
    fn news_page() {
        let doc = fixture("news.html");
        let page = Url::parse("https://news.example.com/posts/season-2").unwrap();
        let news = extract_news(&doc, &page).unwrap();
        assert_eq!(news.title, "Season 2 Patch Notes");
        assert_eq!(
            news.content.as_deref(),
            Some("Season 2 brings a new map.\n\nBalance changes follow.")
        );
        assert_eq!(
            news.image_url.as_deref(),
            Some("https://news.example.com/media/season2.jpg")
        );
    }
}
