use std::collections::HashSet;

use palette_picker::{
    BrightnessFilter, Clusterer, PaletteEngine, PaletteError, Rgb, SortKey, MIN_FILTER_SAMPLES,
};
use proptest::prelude::*;

/// Centers are the first `k` distinct pixels, in input order.
#[derive(Debug)]
struct FirstDistinct;

impl Clusterer for FirstDistinct {
    fn cluster(&self, pixels: &[Rgb], k: usize) -> Vec<[f64; 3]> {
        let mut seen = HashSet::new();
        pixels
            .iter()
            .filter(|c| seen.insert(**c))
            .take(k)
            .map(|c| [c.r as f64, c.g as f64, c.b as f64])
            .collect()
    }
}

const DARK: Rgb = Rgb::new(10, 10, 10);
const MID: Rgb = Rgb::new(128, 128, 128);
const LIGHT: Rgb = Rgb::new(250, 250, 250);

/// 150 samples: 50 dark, 50 mid gray, 50 light.
fn three_grays() -> Vec<Rgb> {
    [DARK, MID, LIGHT]
        .into_iter()
        .flat_map(|c| std::iter::repeat_n(c, 50))
        .collect()
}

/// A varied image-like sample set with plenty of distinct colors.
fn photo_like(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            Rgb::new(
                (40.0 + 200.0 * t) as u8,
                ((i * 53) % 256) as u8,
                (255.0 * (1.0 - t)) as u8,
            )
        })
        .collect()
}

#[test]
fn three_grays_extract_to_their_own_values() {
    let mut engine = PaletteEngine::new(three_grays(), 3).unwrap();
    let mut got = engine.colors().to_vec();
    got.sort();
    assert_eq!(got, vec![DARK, MID, LIGHT]);

    engine.sort_by(SortKey::Brightness);
    assert_eq!(engine.colors(), &[DARK, MID, LIGHT]);
}

#[test]
fn dark_filter_on_three_grays_succeeds() {
    let mut engine = PaletteEngine::new(three_grays(), 3).unwrap();
    let before = engine.colors().to_vec();

    engine.filter_colors(BrightnessFilter::dark(0.5)).unwrap();
    assert!(engine.is_filtered());
    assert_eq!(engine.pixels().len(), MIN_FILTER_SAMPLES);
    assert!(engine.colors().iter().all(|&c| c == MID || c == LIGHT));
    assert_eq!(engine.colors().len(), 3);

    assert!(engine.remove_filter());
    assert_eq!(engine.colors(), before.as_slice());
}

#[test]
fn filter_leaving_nothing_is_insufficient_samples() {
    let mut engine = PaletteEngine::new(three_grays(), 3).unwrap();
    let before = engine.colors().to_vec();

    let err = engine
        .filter_colors(BrightnessFilter::both(0.99, 0.01))
        .unwrap_err();
    assert_eq!(
        err,
        PaletteError::InsufficientSamples {
            remaining: 0,
            required: MIN_FILTER_SAMPLES
        }
    );
    assert_eq!(engine.colors(), before.as_slice());
    assert!(!engine.is_filtered());
    assert_eq!(engine.pixels().len(), 150);
}

#[test]
fn failed_filter_keeps_previous_filter() {
    let mut engine = PaletteEngine::new(photo_like(2000), 5).unwrap();
    engine.filter_colors(BrightnessFilter::dark(0.3)).unwrap();
    let filtered = engine.colors().to_vec();
    let kept = engine.pixels().len();

    assert!(engine.filter_colors(BrightnessFilter::dark(1.0)).is_err());
    assert!(engine.is_filtered());
    assert_eq!(engine.colors(), filtered.as_slice());
    assert_eq!(engine.pixels().len(), kept);
}

#[test]
fn failed_filter_keeps_complement() {
    let mut engine = PaletteEngine::new(three_grays(), 2).unwrap();
    engine.toggle_complementary();
    let before = engine.colors().to_vec();
    assert!(engine.filter_colors(BrightnessFilter::light(0.0)).is_err());
    assert!(engine.is_complementary());
    assert_eq!(engine.colors(), before.as_slice());
}

#[test]
fn hex_of_known_color() {
    let engine = PaletteEngine::new(vec![Rgb::new(255, 87, 51); 20], 1).unwrap();
    assert_eq!(engine.hex_list(), vec!["#FF5733".to_string()]);
}

#[test]
fn every_valid_count_yields_that_many_colors_with_kmeans() {
    let pixels = photo_like(1500);
    for k in 1..=20 {
        let engine = PaletteEngine::new(pixels.clone(), k).unwrap();
        assert_eq!(engine.colors().len(), k, "k={k}");
    }
}

#[test]
fn initialize_rejects_bad_counts_and_thin_data() {
    assert!(matches!(
        PaletteEngine::new(three_grays(), 0),
        Err(PaletteError::InvalidParameter(_))
    ));
    assert!(matches!(
        PaletteEngine::new(three_grays(), 21),
        Err(PaletteError::InvalidParameter(_))
    ));
    assert!(matches!(
        PaletteEngine::new(Vec::new(), 3),
        Err(PaletteError::InvalidParameter(_))
    ));
    assert_eq!(
        PaletteEngine::new(three_grays(), 4).unwrap_err(),
        PaletteError::InsufficientData {
            distinct: 3,
            requested: 4
        }
    );
}

#[test]
fn re_extract_clears_filter_and_complement() {
    let mut engine = PaletteEngine::new(photo_like(1200), 4).unwrap();
    engine.filter_colors(BrightnessFilter::default()).unwrap();
    engine.toggle_complementary();
    engine.sort_by(SortKey::Saturation);

    engine.re_extract(7).unwrap();
    assert_eq!(engine.colors().len(), 7);
    assert_eq!(engine.num_colors(), 7);
    assert!(!engine.is_filtered());
    assert!(!engine.is_complementary());
    assert_eq!(engine.current_sort(), SortKey::Saturation);
    assert_eq!(engine.pixels(), engine.original_pixels());
}

#[test]
fn re_extract_beyond_distinct_colors_fails_cleanly() {
    let mut engine = PaletteEngine::new(three_grays(), 2).unwrap();
    let before = engine.colors().to_vec();
    assert!(matches!(
        engine.re_extract(5),
        Err(PaletteError::InsufficientData { distinct: 3, requested: 5 })
    ));
    assert_eq!(engine.colors(), before.as_slice());
    assert_eq!(engine.num_colors(), 2);
}

fn palette_pixels() -> impl Strategy<Value = Vec<Rgb>> {
    prop::collection::vec(any::<[u8; 3]>().prop_map(Rgb::from), 20..200)
}

fn keys_non_decreasing(colors: &[Rgb], key: SortKey) -> bool {
    colors
        .windows(2)
        .all(|w| key.key(w[0]) <= key.key(w[1]))
}

proptest! {
    #[test]
    fn complement_twice_restores_palette(pixels in palette_pixels(), k in 1usize..=8, sort in 0usize..3) {
        let distinct = pixels.iter().collect::<HashSet<_>>().len();
        prop_assume!(distinct >= k);
        let mut engine = PaletteEngine::with_clusterer(pixels, k, FirstDistinct).unwrap();
        engine.sort_by(SortKey::ALL[sort]);
        let before = engine.colors().to_vec();

        engine.toggle_complementary();
        prop_assert!(engine.is_complementary());
        for c in engine.colors() {
            prop_assert!(before.contains(&c.complement()), "{} is not a complement of the palette", c);
        }
        engine.toggle_complementary();
        prop_assert!(!engine.is_complementary());
        prop_assert_eq!(engine.colors(), before.as_slice());
    }

    #[test]
    fn sort_orders_by_key(pixels in palette_pixels(), k in 1usize..=20) {
        let distinct = pixels.iter().collect::<HashSet<_>>().len();
        prop_assume!(distinct >= k);
        let mut engine = PaletteEngine::with_clusterer(pixels, k, FirstDistinct).unwrap();
        for key in SortKey::ALL {
            engine.sort_by(key);
            prop_assert_eq!(engine.current_sort(), key);
            prop_assert!(keys_non_decreasing(engine.colors(), key));
        }
    }

    #[test]
    fn reverse_twice_is_identity(pixels in palette_pixels(), k in 1usize..=20) {
        let distinct = pixels.iter().collect::<HashSet<_>>().len();
        prop_assume!(distinct >= k);
        let mut engine = PaletteEngine::with_clusterer(pixels, k, FirstDistinct).unwrap();
        let before = engine.colors().to_vec();
        engine.reverse();
        let mut reversed = before.clone();
        reversed.reverse();
        prop_assert_eq!(engine.colors(), reversed.as_slice());
        engine.reverse();
        prop_assert_eq!(engine.colors(), before.as_slice());
    }

    #[test]
    fn remove_filter_restores_snapshot(
        pixels in prop::collection::vec(any::<[u8; 3]>().prop_map(Rgb::from), 300..600),
        k in 1usize..=6,
        min in 0.0f64..0.3,
        complementary in any::<bool>(),
    ) {
        let mut engine = PaletteEngine::with_clusterer(pixels, k, FirstDistinct).unwrap();
        let before = engine.colors().to_vec();
        if complementary {
            engine.toggle_complementary();
        }
        match engine.filter_colors(BrightnessFilter::dark(min)) {
            Ok(()) => {
                prop_assert!(engine.is_filtered());
                prop_assert!(!engine.is_complementary());
                prop_assert!(engine.remove_filter());
                prop_assert_eq!(engine.colors(), before.as_slice());
            }
            Err(e) => {
                let is_insufficient = matches!(e, PaletteError::InsufficientSamples { .. });
                prop_assert!(is_insufficient);
                prop_assert!(!engine.is_filtered());
            }
        }
    }

    #[test]
    fn re_extract_always_has_requested_length(pixels in palette_pixels(), k in 1usize..=5, k2 in 1usize..=20) {
        let distinct = pixels.iter().collect::<HashSet<_>>().len();
        prop_assume!(distinct >= k && distinct >= k2);
        let mut engine = PaletteEngine::with_clusterer(pixels, k, FirstDistinct).unwrap();
        engine.toggle_complementary();
        engine.re_extract(k2).unwrap();
        prop_assert_eq!(engine.colors().len(), k2);
        prop_assert!(!engine.is_filtered());
        prop_assert!(!engine.is_complementary());
    }
}
