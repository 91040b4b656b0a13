//! Ability extraction.
//!
//! The classifier picks the layout once; each layout has its own pure
//! extraction function producing the same [`AbilityExtraction`].

mod current;
mod legacy;

use herodex_shared::Ability;

use crate::classify::{Layout, LayoutKind, classify};
use crate::document::Document;

pub(crate) use current::has_start_row;
pub use current::extract_current;
pub use legacy::extract_legacy;

/// Abilities found on one page.
#[derive(Debug, Clone)]
pub struct AbilityExtraction {
    /// Layout the page was classified as.
    pub layout: LayoutKind,
    /// One entry per start row or info panel, in document order.
    pub abilities: Vec<Ability>,
}

impl AbilityExtraction {
    pub(crate) fn new(layout: LayoutKind) -> Self {
        Self {
            layout,
            abilities: Vec::new(),
        }
    }

    /// Abilities lacking a name or slot.
    pub fn incomplete(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.iter().filter(|a| !a.is_complete())
    }
}

/// Classify the page and run the matching strategy.
pub fn extract_abilities(doc: &Document) -> AbilityExtraction {
    match classify(doc) {
        Layout::Current { table } => extract_current(table),
        Layout::Legacy => extract_legacy(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_layout() {
        let current = Document::parse(
            r#"<table class="ability-table"><tr><td>e</td><td></td><td>dash</td></tr></table>"#,
        );
        let result = extract_abilities(&current);
        assert_eq!(result.layout, LayoutKind::Current);
        assert_eq!(result.abilities[0].name, "Dash");
        assert_eq!(result.abilities[0].slot, "E");

        let legacy = Document::parse(
            r#"<table><tr><td><aside class="portable-infobox">
                <h2 class="pi-title">dash</h2>
                <div data-source="keybind"><div class="pi-data-value">E</div></div>
            </aside></td></tr></table>"#,
        );
        let result = extract_abilities(&legacy);
        assert_eq!(result.layout, LayoutKind::Legacy);
        assert_eq!(result.abilities.len(), 1);
        assert_eq!(result.abilities[0].slot, "E");
    }

    #[test]
    fn incomplete_abilities_are_reported_not_dropped() {
        let doc = Document::parse(
            r#"<table class="ability-table">
                <tr><td>q</td><td></td><td>kept</td></tr>
                <tr><td></td><td></td><td>slotless</td></tr>
            </table>"#,
        );
        let result = extract_abilities(&doc);
        assert_eq!(result.abilities.len(), 2);
        let incomplete: Vec<_> = result.incomplete().map(|a| a.name.as_str()).collect();
        assert_eq!(incomplete, ["Slotless"]);
    }

    #[test]
    fn panels_inside_ability_table_rows_use_legacy() {
        let doc = Document::parse(
            r#"<table class="ability-table"><tr><td><aside class="portable-infobox">
                <h2 class="pi-title">mjolnir bash</h2>
                <div data-source="keybind"><div class="pi-data-value">Primary 1</div></div>
            </aside></td></tr></table>"#,
        );
        let result = extract_abilities(&doc);
        assert_eq!(result.layout, LayoutKind::Legacy);
        assert_eq!(result.abilities.len(), 1);
        assert_eq!(result.abilities[0].name, "Mjolnir Bash");
        assert_eq!(result.abilities[0].slot, "Left Mouse Button");
    }
}
