//! Colour discretization of a rendered layer with k-means.
//!
//! Clustering runs in sRGB space through `kmeans_colors`, seeded with a
//! fixed value so the same layer always discretizes the same way.

use std::collections::HashSet;

use kmeans_colors::get_kmeans;
use palette::Srgb;

use crate::constants::{KMEANS_CONVERGENCE, KMEANS_MAX_ITERATIONS, MAX_KMEANS_K};
use crate::pixel_buffer::PixelBuffer;

/// Cluster assignment for every input pixel plus the cluster colours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clustering {
    /// Cluster index per input pixel
    pub labels: Vec<usize>,
    /// Representative colour per cluster
    pub centroids: Vec<[u8; 3]>,
}

impl Clustering {
    /// Colour assigned to pixel `i`.
    pub fn color_of(&self, i: usize) -> Option<[u8; 3]> {
        self.labels.get(i).and_then(|&l| self.centroids.get(l)).copied()
    }
}

/// Partition `pixels` into at most `k` colour clusters.
///
/// `k` is clamped to `1..=min(255, distinct colours)`. Empty input yields
/// an empty clustering.
pub fn cluster(pixels: &[[u8; 3]], k: usize, seed: u64) -> Clustering {
    if pixels.is_empty() {
        return Clustering::default();
    }
    let distinct = pixels.iter().collect::<HashSet<_>>().len();
    let k = k.clamp(1, MAX_KMEANS_K.min(distinct));

    let colors: Vec<Srgb<f32>> = pixels
        .iter()
        .map(|&[r, g, b]| Srgb::<u8>::new(r, g, b).into_format::<f32>())
        .collect();

    let result = get_kmeans(
        k,
        KMEANS_MAX_ITERATIONS,
        KMEANS_CONVERGENCE,
        false,
        &colors,
        seed,
    );

    let centroids = result
        .centroids
        .iter()
        .map(|&c| {
            let c: Srgb<u8> = c.into_format::<u8>();
            [c.red, c.green, c.blue]
        })
        .collect();
    let labels = result.indices.iter().map(|&i| usize::from(i)).collect();

    log::debug!(
        "kmeans: {} pixels into {} clusters (score {:.4})",
        pixels.len(),
        k,
        result.score
    );
    Clustering { labels, centroids }
}

/// RGB of every pixel of a buffer, row-major.
pub fn buffer_pixels(buffer: &PixelBuffer) -> Vec<[u8; 3]> {
    buffer.enumerate().map(|(_, _, [r, g, b, _])| [r, g, b]).collect()
}

/// Replace every pixel with its cluster colour, keeping alpha.
///
/// Returns false (buffer untouched) if the clustering does not cover the
/// buffer.
pub fn apply(buffer: &mut PixelBuffer, clustering: &Clustering) -> bool {
    let n = buffer.width() as usize * buffer.height() as usize;
    if clustering.labels.len() != n {
        log::warn!(
            "kmeans: {} labels for a buffer of {} pixels, not applied",
            clustering.labels.len(),
            n
        );
        return false;
    }

    for (i, pixel) in buffer.pixels_mut().enumerate() {
        if let Some([r, g, b]) = clustering.color_of(i) {
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        }
    }
    true
}
