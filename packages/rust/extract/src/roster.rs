//! Character roster listing.
//!
//! Each roster row is `image | name | category`. Rows without a name are
//! skipped, and the first row for a given id wins.

use std::collections::HashSet;

use herodex_shared::CharacterIdentity;
use tracing::debug;
use url::Url;

use crate::document::{Document, Node};
use crate::normalize::slugify;
use crate::selectors::{IMAGE, ROSTER_TABLE, ROW};

const ROSTER_COLUMNS: usize = 3;

/// Read every character identity listed on the roster page.
pub fn extract_roster(doc: &Document, page_url: &Url) -> Vec<CharacterIdentity> {
    let mut seen = HashSet::new();
    let mut roster = Vec::new();

    for table in doc.select(&ROSTER_TABLE) {
        for row in table.select(&ROW) {
            let cells = row.children_named("td");
            if cells.len() < ROSTER_COLUMNS {
                continue;
            }

            let name = cells[1].text();
            let id = slugify(&name);
            if name.is_empty() || id.is_empty() {
                debug!("skipping roster row without a name");
                continue;
            }
            if !seen.insert(id.clone()) {
                debug!(character_id = %id, "skipping duplicate roster row");
                continue;
            }

            roster.push(CharacterIdentity {
                id,
                name,
                category: cells[2].text(),
                image_url: image_url(cells[0], page_url),
            });
        }
    }

    roster
}

/// Portrait URL from a lazy-loaded `data-src` or plain `src`, made absolute.
fn image_url(cell: Node<'_>, page_url: &Url) -> Option<String> {
    let img = cell.first(&IMAGE)?;
    let src = ["data-src", "src"]
        .into_iter()
        .filter_map(|name| img.attr(name))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))?;

    page_url.join(src).ok().map(String::from)
}
