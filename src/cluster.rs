//! The clustering capability the palette engine delegates to.
//!
//! [`KmeansClusterer`] runs k-means in sRGB space through `kmeans_colors`.
//! Results are deterministic for a fixed seed and a fixed pixel order; the
//! k-means++ seeding walks the samples in order, so shuffling the same pixels
//! can move the centroids.

use kmeans_colors::{Kmeans, get_kmeans};
use log::debug;
use palette::Srgb;

use crate::color::Rgb;

/// Groups pixel samples into `k` clusters and reports their centers.
pub trait Clusterer {
    /// Returns exactly `k` centroids on the 0-255 scale.
    ///
    /// Callers guarantee `pixels` holds at least `k` distinct colors.
    fn cluster(&self, pixels: &[Rgb], k: usize) -> Vec<[f64; 3]>;
}

/// Tuning knobs for [`KmeansClusterer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmeansConfig {
    /// Iteration cap for a single k-means run.
    pub max_iter: usize,
    /// Convergence threshold on centroid movement (colors normalized to [0, 1]).
    pub converge: f32,
    /// Number of independent runs; the lowest-score run wins.
    pub runs: u64,
    /// Seed of the first run. Run `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for KmeansConfig {
    fn default() -> Self {
        Self {
            max_iter: 20,
            converge: 1e-4,
            runs: 3,
            seed: 42,
        }
    }
}

/// k-means over sRGB samples.
#[derive(Debug, Clone, Default)]
pub struct KmeansClusterer {
    config: KmeansConfig,
}

impl KmeansClusterer {
    pub fn new(config: KmeansConfig) -> Self {
        Self { config }
    }
}

impl Clusterer for KmeansClusterer {
    fn cluster(&self, pixels: &[Rgb], k: usize) -> Vec<[f64; 3]> {
        if pixels.is_empty() || k == 0 {
            return Vec::new();
        }

        let samples: Vec<Srgb<f32>> = pixels
            .iter()
            .map(|c| Srgb::new(c.r, c.g, c.b).into_format())
            .collect();

        let mut best: Option<Kmeans<Srgb<f32>>> = None;
        for run in 0..self.config.runs.max(1) {
            let seed = self.config.seed.wrapping_add(run);
            let result = get_kmeans(
                k,
                self.config.max_iter,
                self.config.converge,
                false,
                &samples,
                seed,
            );
            debug!("k-means run {run} (seed {seed}): score {}", result.score);
            if best.as_ref().is_none_or(|b| result.score < b.score) {
                best = Some(result);
            }
        }
        let Some(best) = best else {
            return Vec::new();
        };

        member_means(pixels, &best.indices, &best.centroids, k)
    }
}

/// Exact per-cluster channel means of the member pixels.
///
/// Averaging the integer samples keeps a cluster of identical pixels at exactly
/// that pixel, which the float centroids only approximate. A cluster without
/// members keeps the routine's own centroid.
fn member_means(pixels: &[Rgb], indices: &[u8], centroids: &[Srgb<f32>], k: usize) -> Vec<[f64; 3]> {
    let mut sums = vec![[0u64; 3]; k];
    let mut counts = vec![0u64; k];
    for (pixel, &idx) in pixels.iter().zip(indices) {
        let idx = idx as usize;
        if idx >= k {
            continue;
        }
        sums[idx][0] += pixel.r as u64;
        sums[idx][1] += pixel.g as u64;
        sums[idx][2] += pixel.b as u64;
        counts[idx] += 1;
    }

    (0..k)
        .map(|i| match (counts[i], centroids.get(i)) {
            (0, Some(c)) => [
                (c.red * 255.0) as f64,
                (c.green * 255.0) as f64,
                (c.blue * 255.0) as f64,
            ],
            (0, None) => [0.0; 3],
            (n, _) => {
                let n = n as f64;
                [
                    sums[i][0] as f64 / n,
                    sums[i][1] as f64 / n,
                    sums[i][2] as f64 / n,
                ]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three gray clusters around 10, 128 and 250 with a little noise.
    fn three_noisy_groups() -> Vec<Rgb> {
        let mut pixels = Vec::new();
        for center in [10u8, 128, 250] {
            for i in 0..60u8 {
                let jitter = i % 5;
                pixels.push(Rgb::new(center - 2 + jitter, center, center + jitter / 2 - 1));
            }
        }
        pixels
    }

    #[test]
    fn returns_k_centroids_in_range() {
        let clusterer = KmeansClusterer::default();
        let pixels: Vec<Rgb> = (0..=255u8)
            .map(|v| Rgb::new(v, 255 - v, v / 2))
            .collect();
        for k in [1, 2, 5, 20] {
            let centroids = clusterer.cluster(&pixels, k);
            assert_eq!(centroids.len(), k);
            for c in centroids {
                for ch in c {
                    assert!((0.0..=255.0).contains(&ch), "channel {ch} out of range");
                }
            }
        }
    }

    #[test]
    fn separates_well_spread_groups() {
        let clusterer = KmeansClusterer::default();
        let mut centroids = clusterer.cluster(&three_noisy_groups(), 3);
        centroids.sort_by(|a, b| a[1].total_cmp(&b[1]));
        for (c, expected) in centroids.iter().zip([10.0, 128.0, 250.0]) {
            for ch in c {
                assert!((ch - expected).abs() < 3.0, "centroid {c:?} not near {expected}");
            }
        }
    }

    #[test]
    fn same_seed_same_result() {
        let pixels: Vec<Rgb> = (0..400u32)
            .map(|i| Rgb::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8))
            .collect();
        let clusterer = KmeansClusterer::new(KmeansConfig {
            seed: 7,
            ..KmeansConfig::default()
        });
        assert_eq!(clusterer.cluster(&pixels, 6), clusterer.cluster(&pixels, 6));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(KmeansClusterer::default().cluster(&[], 3).is_empty());
    }

    #[test]
    fn member_means_falls_back_for_empty_cluster() {
        let pixels = [Rgb::new(0, 0, 0), Rgb::new(2, 4, 6)];
        let centroids = [Srgb::new(0.0f32, 0.0, 0.0), Srgb::new(1.0f32, 1.0, 1.0)];
        let means = member_means(&pixels, &[0, 0], &centroids, 2);
        assert_eq!(means[0], [1.0, 2.0, 3.0]);
        assert_eq!(means[1], [255.0, 255.0, 255.0]);
    }
}
