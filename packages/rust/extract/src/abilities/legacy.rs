//! Legacy-format strategy: one info panel per ability.

use herodex_shared::Ability;
use indexmap::IndexMap;

use super::AbilityExtraction;
use crate::classify::LayoutKind;
use crate::document::{Document, Node, Query};
use crate::normalize::{KeyStyle, canonical_slot, normalize_key_as, title_case};
use crate::selectors::{
    GROUP_LABEL, GROUP_VALUE, HORIZONTAL_GROUP, LEGACY_PANEL, PANEL_DESCRIPTION, PANEL_KEYBIND,
    PANEL_PROPERTIES, PANEL_TITLE,
};

/// Stat key the optional properties field is stored under.
const PROPERTIES_KEY: &str = "properties";

/// Extract one ability per info panel found under the page's table rows.
pub fn extract_legacy(doc: &Document) -> AbilityExtraction {
    let mut out = AbilityExtraction::new(LayoutKind::Legacy);
    for panel in doc.select(&LEGACY_PANEL) {
        out.abilities.push(read_panel(panel));
    }
    out
}

fn read_panel(panel: Node<'_>) -> Ability {
    let name = field_text(panel, &PANEL_TITLE).map(|t| title_case(&t)).unwrap_or_default();
    let slot = field_text(panel, &PANEL_KEYBIND)
        .map(|t| canonical_slot(&t))
        .unwrap_or_default();

    let mut ability = Ability::new(name, slot);
    ability.description = field_text(panel, &PANEL_DESCRIPTION).unwrap_or_default();
    ability.stats = group_stats(panel);

    if let Some(properties) = field_text(panel, &PANEL_PROPERTIES).filter(|p| !p.is_empty()) {
        ability.stats.insert(PROPERTIES_KEY.to_string(), properties);
    }

    ability
}

fn field_text(panel: Node<'_>, query: &Query) -> Option<String> {
    panel.first(query).map(|node| node.text())
}

/// Label/value pairs of every horizontal group, paired by column.
fn group_stats(panel: Node<'_>) -> IndexMap<String, String> {
    let mut stats = IndexMap::new();
    for group in panel.select(&HORIZONTAL_GROUP) {
        let labels = group.select(&GROUP_LABEL);
        let values = group.select(&GROUP_VALUE);
        for (label, value) in labels.iter().zip(values.iter()) {
            let key = normalize_key_as(&label.text(), KeyStyle::Camel);
            if !key.is_empty() {
                stats.insert(key, value.text());
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(title: &str, keybind: &str, body: &str) -> String {
        format!(
            r#"<tr><td><aside class="portable-infobox">
                <h2 class="pi-item pi-title">{title}</h2>
                <div class="pi-item pi-data" data-source="keybind"><div class="pi-data-value">{keybind}</div></div>
                {body}
            </aside></td></tr>"#
        )
    }

    fn extract(rows: &[String]) -> AbilityExtraction {
        let markup = format!("<table class=\"wikitable\">{}</table>", rows.concat());
        extract_legacy(&Document::parse(&markup))
    }

    #[test]
    fn panel_fields_and_camel_stats() {
        let result = extract(&[panel(
            "mjolnir bash",
            "Primary 1",
            r#"<div data-source="description"><div class="pi-data-value">Swing the hammer.</div></div>
               <table class="pi-horizontal-group">
                 <thead><tr>
                   <th class="pi-horizontal-group-item">Cooldown Time</th>
                   <th class="pi-horizontal-group-item">Damage</th>
                 </tr></thead>
                 <tbody><tr>
                   <td class="pi-horizontal-group-item">0.5s</td>
                   <td class="pi-horizontal-group-item">70</td>
                 </tr></tbody>
               </table>
               <div data-source="properties"><div class="pi-data-value">Melee</div></div>"#,
        )]);

        assert_eq!(result.abilities.len(), 1);
        let ability = &result.abilities[0];
        assert_eq!(ability.name, "Mjolnir Bash");
        assert_eq!(ability.slot, "Left Mouse Button");
        assert_eq!(ability.description, "Swing the hammer.");
        let pairs: Vec<(&str, &str)> = ability
            .stats
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [("cooldownTime", "0.5s"), ("damage", "70"), ("properties", "Melee")]
        );
    }

    #[test]
    fn every_panel_yields_one_ability() {
        let result = extract(&[
            panel("a", "Q", ""),
            panel("b", "Left Shift", ""),
            panel("c", "C", ""),
        ]);
        let slots: Vec<&str> = result.abilities.iter().map(|a| a.slot.as_str()).collect();
        assert_eq!(slots, ["Q", "Left Shift", "C"]);
        assert_eq!(result.incomplete().count(), 0);
    }

    #[test]
    fn panel_without_keybind_is_incomplete() {
        let markup = r#"<table><tr><td><aside class="portable-infobox">
            <h2 class="pi-title">floating</h2>
        </aside></td></tr></table>"#;
        let result = extract_legacy(&Document::parse(markup));
        assert_eq!(result.abilities.len(), 1);
        assert_eq!(result.abilities[0].name, "Floating");
        assert_eq!(result.incomplete().count(), 1);
    }

    #[test]
    fn panels_outside_table_rows_are_ignored() {
        let markup = r#"<aside class="portable-infobox">
            <h2 class="pi-title">Character Infobox</h2>
            <div data-source="keybind"><div class="pi-data-value">Q</div></div>
        </aside>"#;
        assert!(extract_legacy(&Document::parse(markup)).abilities.is_empty());
    }
}
