//! The palette engine: owns the pixel samples of one image and the palette
//! derived from them, and applies every user-facing transformation.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use crate::cluster::{Clusterer, KmeansClusterer};
use crate::color::{Rgb, SortKey};
use crate::error::{PaletteError, Result};
use crate::export;

/// Smallest palette size that can be requested.
pub const MIN_COLORS: usize = 1;
/// Largest palette size that can be requested.
pub const MAX_COLORS: usize = 20;
/// A filter that leaves fewer pixels than this is not applied.
pub const MIN_FILTER_SAMPLES: usize = 100;

/// Which pixels a brightness filter drops before re-clustering.
///
/// Brightness is the HSV value in [0, 1]. With `filter_dark`, samples below
/// `min_brightness` are dropped; with `filter_light`, samples above
/// `max_brightness` are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessFilter {
    pub filter_dark: bool,
    pub filter_light: bool,
    pub min_brightness: f64,
    pub max_brightness: f64,
}

impl Default for BrightnessFilter {
    fn default() -> Self {
        Self {
            filter_dark: true,
            filter_light: true,
            min_brightness: 0.15,
            max_brightness: 0.85,
        }
    }
}

impl BrightnessFilter {
    /// Drops only samples darker than `min_brightness`.
    pub fn dark(min_brightness: f64) -> Self {
        Self {
            filter_light: false,
            min_brightness,
            ..Self::default()
        }
    }

    /// Drops only samples brighter than `max_brightness`.
    pub fn light(max_brightness: f64) -> Self {
        Self {
            filter_dark: false,
            max_brightness,
            ..Self::default()
        }
    }

    /// Drops samples outside `[min_brightness, max_brightness]`.
    pub fn both(min_brightness: f64, max_brightness: f64) -> Self {
        Self {
            min_brightness,
            max_brightness,
            ..Self::default()
        }
    }

    /// Thresholds must lie in [0, 1] and at least one side must be active.
    /// With both sides active the thresholds may not be equal.
    ///
    /// An inverted window (`min > max` with both sides active) is accepted here;
    /// it keeps no samples and is reported by the engine as too few samples.
    pub fn validate(&self) -> Result<()> {
        if !self.filter_dark && !self.filter_light {
            return Err(PaletteError::InvalidParameter(
                "filter must drop dark colors, light colors, or both".into(),
            ));
        }
        for (name, value, active) in [
            ("min_brightness", self.min_brightness, self.filter_dark),
            ("max_brightness", self.max_brightness, self.filter_light),
        ] {
            if active && !(0.0..=1.0).contains(&value) {
                return Err(PaletteError::InvalidParameter(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.filter_dark && self.filter_light && self.min_brightness == self.max_brightness {
            return Err(PaletteError::InvalidParameter(format!(
                "min_brightness must be lower than max_brightness, both are {}",
                self.min_brightness
            )));
        }
        Ok(())
    }

    /// Thresholds are inclusive: a sample exactly at either bound is kept.
    pub fn keeps(&self, color: Rgb) -> bool {
        let v = color.brightness();
        !(self.filter_dark && v < self.min_brightness)
            && !(self.filter_light && v > self.max_brightness)
    }
}

/// State kept while a brightness filter is in effect.
#[derive(Debug, Clone)]
struct ActiveFilter {
    settings: BrightnessFilter,
    pixels: Vec<Rgb>,
    unfiltered_colors: Vec<Rgb>,
}

/// A palette extracted from one image, plus the state of every transformation
/// applied to it since.
///
/// The palette always holds `num_colors` entries. After any change to which
/// colors it contains it is re-sorted by [`current_sort`](Self::current_sort).
/// Failing operations leave the engine untouched.
#[derive(Debug, Clone)]
pub struct PaletteEngine<C: Clusterer = KmeansClusterer> {
    clusterer: C,
    original_pixels: Vec<Rgb>,
    distinct_colors: usize,
    colors: Vec<Rgb>,
    num_colors: usize,
    current_sort: SortKey,
    filter: Option<ActiveFilter>,
    is_complementary: bool,
}

impl PaletteEngine<KmeansClusterer> {
    /// Extracts `num_colors` colors from `pixels` with the default k-means settings.
    pub fn new(pixels: Vec<Rgb>, num_colors: usize) -> Result<Self> {
        Self::with_clusterer(pixels, num_colors, KmeansClusterer::default())
    }
}

impl<C: Clusterer> PaletteEngine<C> {
    /// Extracts `num_colors` colors from `pixels` using `clusterer`, sorted by hue.
    pub fn with_clusterer(pixels: Vec<Rgb>, num_colors: usize, clusterer: C) -> Result<Self> {
        validate_color_count(num_colors)?;
        if pixels.is_empty() {
            return Err(PaletteError::InvalidParameter(
                "pixel set is empty".into(),
            ));
        }
        let distinct_colors = count_distinct(&pixels);
        ensure_distinct(distinct_colors, num_colors)?;

        let mut engine = Self {
            clusterer,
            original_pixels: pixels,
            distinct_colors,
            colors: Vec::new(),
            num_colors,
            current_sort: SortKey::Hue,
            filter: None,
            is_complementary: false,
        };
        engine.colors = engine.extract(&engine.original_pixels, num_colors);
        engine.resort();
        info!(
            "extracted {num_colors} colors from {} pixels ({distinct_colors} distinct)",
            engine.original_pixels.len()
        );
        Ok(engine)
    }

    /// The current palette, in display order.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    pub fn current_sort(&self) -> SortKey {
        self.current_sort
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    pub fn is_complementary(&self) -> bool {
        self.is_complementary
    }

    /// Settings of the brightness filter in effect, if any.
    pub fn active_filter(&self) -> Option<&BrightnessFilter> {
        self.filter.as_ref().map(|f| &f.settings)
    }

    /// Pixels currently feeding the clustering: the filtered subset while a
    /// filter is active, otherwise every sample.
    pub fn pixels(&self) -> &[Rgb] {
        match &self.filter {
            Some(active) => &active.pixels,
            None => &self.original_pixels,
        }
    }

    /// Every sample of the image, regardless of filtering.
    pub fn original_pixels(&self) -> &[Rgb] {
        &self.original_pixels
    }

    /// Clusters `pixels` into `k` colors, truncating each centroid channel.
    ///
    /// With no more than `k` distinct colors there is nothing to cluster: the
    /// distinct colors are used as they are, most frequent first, repeated to
    /// fill the palette when there are fewer than `k`.
    fn extract(&self, pixels: &[Rgb], k: usize) -> Vec<Rgb> {
        let by_frequency = distinct_by_frequency(pixels);
        if by_frequency.len() <= k {
            debug!("{} distinct colors for {k} slots, skipping clustering", by_frequency.len());
            return by_frequency.into_iter().cycle().take(k).collect();
        }

        let centroids = self.clusterer.cluster(pixels, k);
        debug_assert_eq!(centroids.len(), k, "clusterer returned wrong centroid count");
        debug!("clustered {} pixels into {} centroids", pixels.len(), centroids.len());
        centroids
            .into_iter()
            .map(|[r, g, b]| Rgb::new(truncate(r), truncate(g), truncate(b)))
            .collect()
    }

    fn resort(&mut self) {
        self.current_sort.sort(&mut self.colors);
    }

    /// Re-clusters every sample of the image into `num_colors` colors.
    ///
    /// Any active filter is dropped together with its pixel subset, and the
    /// complementary view is cleared.
    pub fn re_extract(&mut self, num_colors: usize) -> Result<()> {
        validate_color_count(num_colors)?;
        ensure_distinct(self.distinct_colors, num_colors)?;

        self.colors = self.extract(&self.original_pixels, num_colors);
        self.num_colors = num_colors;
        self.filter = None;
        self.is_complementary = false;
        self.resort();
        info!("re-extracted palette with {num_colors} colors");
        Ok(())
    }

    /// Orders the palette ascending by `key` and remembers it as the current sort.
    pub fn sort_by(&mut self, key: SortKey) {
        self.current_sort = key;
        self.resort();
    }

    /// Reverses the display order. The sort label is left as is.
    pub fn reverse(&mut self) {
        self.colors.reverse();
    }

    /// Drops too-dark and/or too-light pixels and re-clusters the rest.
    ///
    /// The filter always applies to the full sample set, so filtering again
    /// replaces the previous filter rather than narrowing it. The complementary
    /// view is reverted first. The palette shown before the first filter is kept
    /// for [`remove_filter`](Self::remove_filter).
    ///
    /// Fails with [`PaletteError::InsufficientSamples`] when fewer than
    /// [`MIN_FILTER_SAMPLES`] pixels survive; nothing changes in that case.
    pub fn filter_colors(&mut self, settings: BrightnessFilter) -> Result<()> {
        settings.validate()?;

        let subset: Vec<Rgb> = self
            .original_pixels
            .iter()
            .copied()
            .filter(|&c| settings.keeps(c))
            .collect();
        if subset.len() < MIN_FILTER_SAMPLES {
            warn!(
                "filter kept {} of {} pixels, keeping current palette",
                subset.len(),
                self.original_pixels.len()
            );
            return Err(PaletteError::InsufficientSamples {
                remaining: subset.len(),
                required: MIN_FILTER_SAMPLES,
            });
        }

        if self.is_complementary {
            self.toggle_complementary();
        }
        let unfiltered_colors = match self.filter.take() {
            Some(previous) => previous.unfiltered_colors,
            None => self.colors.clone(),
        };

        self.colors = self.extract(&subset, self.num_colors);
        self.resort();
        info!(
            "filter applied: {} of {} pixels kept",
            subset.len(),
            self.original_pixels.len()
        );
        self.filter = Some(ActiveFilter {
            settings,
            pixels: subset,
            unfiltered_colors,
        });
        Ok(())
    }

    /// Restores the palette captured before filtering and clears the
    /// complementary view. Returns `false` if no filter was active.
    pub fn remove_filter(&mut self) -> bool {
        let Some(active) = self.filter.take() else {
            return false;
        };
        self.colors = active.unfiltered_colors;
        self.resort();
        self.is_complementary = false;
        info!("filter removed");
        true
    }

    /// Replaces every color with its complement and flips the complementary flag.
    ///
    /// Complementing is its own inverse and sorting depends only on which colors
    /// are present, so toggling twice gives back the same palette in the same order.
    pub fn toggle_complementary(&mut self) {
        for c in &mut self.colors {
            *c = c.complement();
        }
        self.resort();
        self.is_complementary = !self.is_complementary;
        debug!("complementary view: {}", self.is_complementary);
    }

    /// `#RRGGBB` for every palette entry, in display order.
    pub fn hex_list(&self) -> Vec<String> {
        export::hex_list(&self.colors)
    }

    /// `rgba(r, g, b, opacity)` for every palette entry, in display order.
    pub fn rgba_list(&self, opacity: f64) -> Vec<String> {
        export::rgba_list(&self.colors, opacity)
    }

    /// Raw `[r, g, b]` triples, in display order.
    pub fn rgb_list(&self) -> Vec<[u8; 3]> {
        self.colors.iter().map(|c| c.to_array()).collect()
    }
}

fn validate_color_count(num_colors: usize) -> Result<()> {
    if !(MIN_COLORS..=MAX_COLORS).contains(&num_colors) {
        return Err(PaletteError::InvalidParameter(format!(
            "number of colors must be between {MIN_COLORS} and {MAX_COLORS}, got {num_colors}"
        )));
    }
    Ok(())
}

fn ensure_distinct(distinct: usize, requested: usize) -> Result<()> {
    if distinct < requested {
        return Err(PaletteError::InsufficientData {
            distinct,
            requested,
        });
    }
    Ok(())
}

fn count_distinct(pixels: &[Rgb]) -> usize {
    pixels.iter().collect::<HashSet<_>>().len()
}

/// Distinct colors, most frequent first, ties by RGB value.
fn distinct_by_frequency(pixels: &[Rgb]) -> Vec<Rgb> {
    let mut counts: HashMap<Rgb, usize> = HashMap::new();
    for &c in pixels {
        *counts.entry(c).or_default() += 1;
    }
    let mut colors: Vec<(Rgb, usize)> = counts.into_iter().collect();
    colors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    colors.into_iter().map(|(c, _)| c).collect()
}

/// Floor toward zero, saturating at the channel bounds.
fn truncate(channel: f64) -> u8 {
    channel.clamp(0.0, 255.0) as u8
}
