//! RGB colors and the HSV keys used for sorting and brightness filtering.

use std::fmt;

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// An 8-bit RGB color: a pixel sample or an extracted palette entry.
///
/// Serializes as a raw `[r, g, b]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel inversion (`255 - channel`). Applying it twice is the identity.
    pub const fn complement(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Hue, saturation and value, each in [0, 1].
    ///
    /// Achromatic colors report a hue of 0.
    pub fn hsv(self) -> (f32, f32, f32) {
        let rgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        let hsv: Hsv = Hsv::from_color(rgb);
        let hue = if hsv.saturation == 0.0 {
            0.0
        } else {
            // into_positive_degrees can land on exactly 360 after rounding.
            (hsv.hue.into_positive_degrees() / 360.0).min(1.0) % 1.0
        };
        (hue, hsv.saturation, hsv.value)
    }

    pub fn hue(self) -> f32 {
        self.hsv().0
    }

    pub fn saturation(self) -> f32 {
        self.hsv().1
    }

    /// HSV value, the brightest channel over 255, computed in `f64` so that
    /// channel values land exactly on thresholds such as 0.2 or 0.8.
    pub fn brightness(self) -> f64 {
        self.r.max(self.g).max(self.b) as f64 / 255.0
    }

    /// Uppercase `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        c.to_array()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
    }
}

/// HSV component a palette is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Hue,
    Saturation,
    Brightness,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Hue, SortKey::Saturation, SortKey::Brightness];

    pub fn key(self, color: Rgb) -> f32 {
        let (h, s, v) = color.hsv();
        match self {
            SortKey::Hue => h,
            SortKey::Saturation => s,
            SortKey::Brightness => v,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortKey::Hue => "hue",
            SortKey::Saturation => "saturation",
            SortKey::Brightness => "brightness",
        }
    }

    /// Sorts ascending by this key.
    ///
    /// Ties on the key are broken by the RGB value, so the result depends only on
    /// which colors are present, never on their incoming order. This is not a
    /// stable sort: colors with equal keys do not keep the order a previous
    /// [`reverse`](crate::PaletteEngine::reverse) gave them.
    pub fn sort(self, colors: &mut [Rgb]) {
        colors.sort_by_cached_key(|&c| (OrderedKey(self.key(c)), c));
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `f32` with a total order, for use as a sort key.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedKey(f32);

impl Eq for OrderedKey {}

impl PartialOrd for OrderedKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
