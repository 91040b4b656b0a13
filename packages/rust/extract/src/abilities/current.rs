//! Current-format strategy: a three-column ability table.
//!
//! Rows are read in document order by a two-state machine. A start row (three
//! data cells) opens a new ability and closes the previous one; a continuation
//! row (one cell spanning the table) enriches the open ability. Continuation
//! rows with no open ability are ignored.

use herodex_shared::Ability;
use tracing::debug;

use super::AbilityExtraction;
use crate::classify::LayoutKind;
use crate::document::Node;
use crate::normalize::{mouse_binding, normalize_key, title_case};
use crate::selectors::{ABILITY_DESCRIPTION, BOLD, DESCRIPTION_BLOCK, IMAGE};

/// Data cells per start row, which is also the table width.
const TABLE_WIDTH: usize = 3;

/// Separator between a bolded stat label and its value.
const PAIR_SEPARATOR: &str = " - ";

enum RowState {
    NoActiveAbility,
    ActiveAbility(Ability),
}

enum Row<'a> {
    Start([Node<'a>; TABLE_WIDTH]),
    Continuation(Node<'a>),
    Other,
}

/// Extract abilities from the located ability table.
pub fn extract_current(table: Node<'_>) -> AbilityExtraction {
    let mut out = AbilityExtraction::new(LayoutKind::Current);
    let mut state = RowState::NoActiveAbility;

    for row in table_rows(table) {
        match read_row(row) {
            Row::Start(cells) => {
                let next = RowState::ActiveAbility(start_ability(&cells));
                if let RowState::ActiveAbility(done) = std::mem::replace(&mut state, next) {
                    out.abilities.push(done);
                }
            }
            Row::Continuation(cell) => match &mut state {
                RowState::ActiveAbility(ability) => apply_continuation(ability, cell),
                RowState::NoActiveAbility => debug!("continuation row without ability, ignored"),
            },
            Row::Other => {}
        }
    }

    if let RowState::ActiveAbility(done) = state {
        out.abilities.push(done);
    }

    out
}

/// Whether the table holds at least one start row.
pub(crate) fn has_start_row(table: Node<'_>) -> bool {
    table_rows(table)
        .into_iter()
        .any(|row| matches!(read_row(row), Row::Start(_)))
}

/// Rows belonging to this table, excluding rows of nested tables.
fn table_rows(table: Node<'_>) -> Vec<Node<'_>> {
    let mut rows = Vec::new();
    for child in table.children() {
        match child.tag() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child.children_named("tr")),
            _ => {}
        }
    }
    rows
}

fn read_row(row: Node<'_>) -> Row<'_> {
    let cells = row.children_named("td");
    match cells.as_slice() {
        [a, b, c] => Row::Start([*a, *b, *c]),
        [cell] if cell.colspan() >= TABLE_WIDTH => Row::Continuation(*cell),
        _ => Row::Other,
    }
}

/// Build an ability from a start row: slot from the first cell, name from the last.
fn start_ability(cells: &[Node<'_>; TABLE_WIDTH]) -> Ability {
    let [slot_cell, _, name_cell] = cells;

    let slot = slot_cell
        .select(&IMAGE)
        .iter()
        .flat_map(|img| img.labels())
        .find_map(mouse_binding)
        .map(str::to_string)
        .unwrap_or_else(|| slot_cell.text().to_uppercase());

    Ability::new(title_case(&name_cell.text()), slot)
}

/// Fold a continuation row into the open ability.
fn apply_continuation(ability: &mut Ability, cell: Node<'_>) {
    if let Some(description) = cell.first(&ABILITY_DESCRIPTION) {
        ability.description = description.text();
    }

    for bold in cell.select(&BOLD) {
        if bold.is_within(&DESCRIPTION_BLOCK) {
            continue;
        }

        let label = bold.text();
        let (key, value) = match label.split_once(PAIR_SEPARATOR) {
            Some((key, value)) => (normalize_key(key), value.trim().to_string()),
            None => (
                normalize_key(&label),
                bold.following_text()
                    .map(|text| strip_leading_separator(&text))
                    .unwrap_or_default(),
            ),
        };

        if key.is_empty() || value.is_empty() {
            debug!(ability = %ability.name, label = %label, "stat label without value, skipped");
            continue;
        }
        ability.stats.insert(key, value);
    }
}

fn strip_leading_separator(text: &str) -> String {
    text.trim()
        .trim_start_matches([':', '-', '–', '—'])
        .trim()
        .to_string()
}
