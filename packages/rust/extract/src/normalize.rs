//! Key and token normalization.
//!
//! Pure functions shared by every extractor: label → key, title-casing,
//! and the fixed binding-token tables.

/// Binding label → canonical slot token for legacy info panels.
/// Tokens not listed pass through unchanged.
pub const SLOT_TABLE: &[(&str, &str)] = &[
    ("Primary 1", "Left Mouse Button"),
    ("Primary 2", "Right Mouse Button"),
    ("Primary", "Left Mouse Button"),
    ("Q", "Q"),
    ("E", "E"),
    ("F", "F"),
    ("Passive", "Passive"),
    ("Left Shift", "Left Shift"),
];

/// Image label fragment (lower-case) → slot token for mouse-button icons.
pub const MOUSE_BINDINGS: &[(&str, &str)] = &[
    ("left mouse button", "Left Mouse Button"),
    ("right mouse button", "Right Mouse Button"),
];

/// Output casing for normalized keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// `cooldown_time`
    Snake,
    /// `cooldownTime`, the historical casing of legacy panel stats.
    Camel,
}

/// Normalize a free-text label to a snake-case key.
///
/// Lower-cases, collapses whitespace runs to one underscore and strips
/// trailing separator artifacts (`:`, `-`, dashes, underscores).
pub fn normalize_key(label: &str) -> String {
    let trimmed = label.trim().trim_end_matches(is_separator_artifact);
    trimmed
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
        .trim_matches('_')
        .to_string()
}

/// Normalize a label in the requested style.
pub fn normalize_key_as(label: &str, style: KeyStyle) -> String {
    let key = normalize_key(label);
    match style {
        KeyStyle::Snake => key,
        KeyStyle::Camel => snake_to_camel(&key),
    }
}

/// `energy_cost` → `energyCost`.
pub fn snake_to_camel(key: &str) -> String {
    let mut parts = key.split('_').filter(|p| !p.is_empty());
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Capitalize the first letter of each word and lower-case the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a legacy binding label through [`SLOT_TABLE`].
pub fn canonical_slot(token: &str) -> String {
    let token = token.trim();
    SLOT_TABLE
        .iter()
        .find(|(source, _)| *source == token)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| token.to_string())
}

/// Slot for an image label that names a mouse button.
pub fn mouse_binding(label: &str) -> Option<&'static str> {
    let label = label.to_lowercase();
    MOUSE_BINDINGS
        .iter()
        .find(|(fragment, _)| label.contains(fragment))
        .map(|(_, slot)| *slot)
}

/// Generate a URL-safe slug from a display name.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn is_separator_artifact(c: char) -> bool {
    matches!(c, ':' | '-' | '–' | '—' | '_') || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_snake_case() {
        assert_eq!(normalize_key("Cooldown"), "cooldown");
        assert_eq!(normalize_key("  Energy   Cost "), "energy_cost");
        assert_eq!(normalize_key("Range:"), "range");
        assert_eq!(normalize_key("Projectile Speed -"), "projectile_speed");
    }

    #[test]
    fn keys_in_camel_style() {
        assert_eq!(normalize_key_as("Cooldown Time", KeyStyle::Camel), "cooldownTime");
        assert_eq!(normalize_key_as("Damage", KeyStyle::Camel), "damage");
        assert_eq!(
            normalize_key_as("Damage Per Second", KeyStyle::Snake),
            "damage_per_second"
        );
    }

    #[test]
    fn title_casing() {
        assert_eq!(title_case("web STRIKE"), "Web Strike");
        assert_eq!(title_case("  get over   here! "), "Get Over Here!");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn slot_table_is_total() {
        for (source, canonical) in SLOT_TABLE {
            assert_eq!(canonical_slot(source), *canonical);
        }
        assert_eq!(canonical_slot("Primary 1"), "Left Mouse Button");
        assert_eq!(canonical_slot("Primary 2"), "Right Mouse Button");
        assert_eq!(canonical_slot("Primary"), "Left Mouse Button");
    }

    #[test]
    fn unmapped_slots_pass_through() {
        assert_eq!(canonical_slot("C"), "C");
        assert_eq!(canonical_slot("Right Shift"), "Right Shift");
        assert_eq!(canonical_slot("primary"), "primary");
    }

    #[test]
    fn mouse_bindings() {
        assert_eq!(mouse_binding("Left mouse button"), Some("Left Mouse Button"));
        assert_eq!(mouse_binding("RIGHT MOUSE BUTTON icon"), Some("Right Mouse Button"));
        assert_eq!(mouse_binding("LMB-icon"), None);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Spider-Man"), "spider-man");
        assert_eq!(slugify("Rocket  Raccoon"), "rocket-raccoon");
        assert_eq!(slugify("Cloak & Dagger"), "cloak-dagger");
    }
}
