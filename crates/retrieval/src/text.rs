//! Text helpers for Turkish-aware substring matching.

/// Case-fold text for substring matching.
///
/// Unicode lowercasing maps the Turkish dotted capital İ to `i` plus a
/// combining dot above (U+0307); the combining mark would sit between
/// the letters and defeat plain substring patterns like "iş kanunu".
/// Dropping it after lowercasing keeps those patterns matching.
pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase().replace('\u{0307}', "")
}
