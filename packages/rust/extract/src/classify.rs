//! Layout classification for character pages.
//!
//! Two mutually exclusive layout generations exist. A page is current-format
//! exactly when an ability table holds at least one three-cell start row.
//! Legacy pages also wrap their info panels in ability-table rows, so the
//! table class alone decides nothing.

use crate::abilities::has_start_row;
use crate::document::{Document, Node};
use crate::selectors::ABILITY_TABLE;

/// Which ability layout a page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Current,
    Legacy,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Legacy => "legacy",
        }
    }
}

/// Classification result, carrying the located ability table for current pages.
#[derive(Debug, Clone, Copy)]
pub enum Layout<'a> {
    Current { table: Node<'a> },
    Legacy,
}

impl Layout<'_> {
    pub fn kind(&self) -> LayoutKind {
        match self {
            Self::Current { .. } => LayoutKind::Current,
            Self::Legacy => LayoutKind::Legacy,
        }
    }
}

/// Classify a parsed character page.
pub fn classify(doc: &Document) -> Layout<'_> {
    doc.select(&ABILITY_TABLE)
        .into_iter()
        .find(|table| has_start_row(*table))
        .map_or(Layout::Legacy, |table| Layout::Current { table })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_table_means_current() {
        let doc = Document::parse(
            r#"<table class="wikitable ability-table"><tr><td>Q</td><td></td><td>Dash</td></tr></table>"#,
        );
        assert_eq!(classify(&doc).kind(), LayoutKind::Current);
    }

    #[test]
    fn anything_else_is_legacy() {
        let doc = Document::parse(r#"<table class="wikitable"><tr><td>x</td></tr></table>"#);
        assert_eq!(classify(&doc).kind(), LayoutKind::Legacy);

        let empty = Document::parse("");
        assert_eq!(classify(&empty).kind(), LayoutKind::Legacy);
    }

    #[test]
    fn ability_table_of_panels_is_legacy() {
        let doc = Document::parse(
            r#"<table class="ability-table"><tr><td><aside class="portable-infobox">
                <h2 class="pi-title">Bash</h2>
            </aside></td></tr></table>"#,
        );
        assert_eq!(classify(&doc).kind(), LayoutKind::Legacy);
    }

    #[test]
    fn first_table_with_start_rows_is_used() {
        let doc = Document::parse(
            r#"<table class="ability-table" id="panels"><tr><td>panel</td></tr></table>
               <table class="ability-table" id="rows"><tr><td>E</td><td></td><td>Dash</td></tr></table>"#,
        );
        match classify(&doc) {
            Layout::Current { table } => assert_eq!(table.attr("id"), Some("rows")),
            Layout::Legacy => panic!("expected current layout"),
        }
    }
}
