//! Text projections of a palette for copying and printing.

use crate::color::Rgb;

pub fn hex_list(colors: &[Rgb]) -> Vec<String> {
    colors.iter().map(|c| c.to_hex()).collect()
}

/// One `rgba(r, g, b, opacity)` string per color.
///
/// The opacity keeps its decimal point, so `1.0` prints as `1.0`, not `1`.
pub fn rgba_list(colors: &[Rgb], opacity: f64) -> Vec<String> {
    colors
        .iter()
        .map(|c| format!("rgba({}, {}, {}, {opacity:?})", c.r, c.g, c.b))
        .collect()
}

/// `(r, g, b), (r, g, b), ...` as pasted into stylesheets and design tools.
pub fn rgb_clipboard_text(colors: &[Rgb]) -> String {
    colors
        .iter()
        .map(|c| format!("({}, {}, {})", c.r, c.g, c.b))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `#RRGGBB, #RRGGBB, ...`
pub fn hex_clipboard_text(colors: &[Rgb]) -> String {
    hex_list(colors).join(", ")
}

/// Pretty-printed JSON array of `rgba(...)` strings.
pub fn rgba_json(colors: &[Rgb], opacity: f64) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&rgba_list(colors, opacity))
}

/// JSON array of `[r, g, b]` triples.
pub fn rgb_json(colors: &[Rgb]) -> serde_json::Result<String> {
    serde_json::to_string(colors)
}
