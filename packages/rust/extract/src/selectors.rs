//! Built-in queries describing the wiki's markup.

use std::sync::LazyLock;

use crate::document::Query;

macro_rules! query {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Query> = LazyLock::new(|| Query::fixed($css));
    };
}

// Current-format ability listing
query!(ABILITY_TABLE, "table.ability-table");
query!(ABILITY_DESCRIPTION, ".ability-description i, .ability-description em");
query!(DESCRIPTION_BLOCK, ".ability-description");
query!(BOLD, "b, strong");
query!(IMAGE, "img");

// Legacy-format info panels
query!(LEGACY_PANEL, "tr aside.portable-infobox");
query!(PANEL_TITLE, ".pi-title");
query!(PANEL_KEYBIND, r#"[data-source="keybind"] .pi-data-value"#);
query!(PANEL_DESCRIPTION, r#"[data-source="description"] .pi-data-value"#);
query!(PANEL_PROPERTIES, r#"[data-source="properties"] .pi-data-value"#);
query!(HORIZONTAL_GROUP, "table.pi-horizontal-group");
query!(GROUP_LABEL, "th.pi-horizontal-group-item");
query!(GROUP_VALUE, "td.pi-horizontal-group-item");

// Character stats
query!(HEALTH_VALUE, r#"[data-source="health"] .pi-data-value"#);
query!(DIFFICULTY_PANEL, r#"[data-source="difficulty"]"#);

// Lore
query!(QUOTE, "blockquote");
query!(PARAGRAPH, "p");

// Roster
query!(ROSTER_TABLE, "table.roster");
query!(ROW, "tr");

// News
query!(OG_TITLE, r#"meta[property="og:title"]"#);
query!(OG_IMAGE, r#"meta[property="og:image"]"#);
query!(META_DESCRIPTION, r#"meta[name="description"], meta[property="og:description"]"#);
query!(HEADING, "h1");
query!(PAGE_TITLE, "title");
query!(ARTICLE_PARAGRAPH, "article p");
query!(MAIN_PARAGRAPH, "main p");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_selectors_compile() {
        for query in [
            &ABILITY_TABLE,
            &ABILITY_DESCRIPTION,
            &DESCRIPTION_BLOCK,
            &BOLD,
            &IMAGE,
            &LEGACY_PANEL,
            &PANEL_TITLE,
            &PANEL_KEYBIND,
            &PANEL_DESCRIPTION,
            &PANEL_PROPERTIES,
            &HORIZONTAL_GROUP,
            &GROUP_LABEL,
            &GROUP_VALUE,
            &HEALTH_VALUE,
            &DIFFICULTY_PANEL,
            &QUOTE,
            &PARAGRAPH,
            &ROSTER_TABLE,
            &ROW,
            &OG_TITLE,
            &OG_IMAGE,
            &META_DESCRIPTION,
            &HEADING,
            &PAGE_TITLE,
            &ARTICLE_PARAGRAPH,
            &MAIN_PARAGRAPH,
        ] {
            LazyLock::force(query);
        }
    }
}
