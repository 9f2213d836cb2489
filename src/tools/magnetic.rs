//! Edge-snapping draw.
//!
//! The Source Image's red channel is used as an edge strength map. Around
//! the brush origin a window of `4 * pen_size` pixels per side (radius
//! `2 * pen_size`) is scanned for the strongest pixel. With a previous anchor
//! the stroke advances by one pixel only: to whichever 4-neighbour of the
//! anchor is closest to that strongest pixel.

use crate::constants::MAX_PEN_SIZE;
use crate::pixel_buffer::PixelBuffer;

/// Window radius in pixels for a pen size.
pub fn snap_radius(pen_size: u32) -> i32 {
    pen_size.min(MAX_PEN_SIZE) as i32 * 2
}

/// Strongest pixel of the window around `(x, y)`.
///
/// Columns are scanned left to right, each top to bottom; the first strictly
/// greater intensity wins. Returns `(x, y)` itself if the whole window is 0.
pub fn strongest_edge(source: &PixelBuffer, x: i32, y: i32, pen_size: u32) -> (i32, i32) {
    let radius = snap_radius(pen_size);
    let mut best = (x, y);
    let mut max_intensity = 0u8;

    for i in 0..radius * 2 {
        for j in 0..radius * 2 {
            let (px, py) = (x + i - radius, y + j - radius);
            let intensity = source.pixel(px, py)[0];
            if intensity > max_intensity {
                max_intensity = intensity;
                best = (px, py);
            }
        }
    }
    best
}

/// Point to draw at for a magnetic stroke step.
pub fn snap_point(
    source: &PixelBuffer,
    x: i32,
    y: i32,
    pen_size: u32,
    anchor: Option<(i32, i32)>,
) -> (i32, i32) {
    let candidate = strongest_edge(source, x, y, pen_size);
    let Some((ax, ay)) = anchor else {
        return candidate;
    };

    let neighbours = [(ax - 1, ay), (ax + 1, ay), (ax, ay - 1), (ax, ay + 1)];
    let mut closest = neighbours[0];
    let mut min_distance = f64::INFINITY;
    for &(nx, ny) in &neighbours {
        let dx = f64::from(nx - candidate.0);
        let dy = f64::from(ny - candidate.1);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < min_distance {
            min_distance = distance;
            closest = (nx, ny);
        }
    }
    closest
}
