//! Bucket fill: 4-connected region growth with a colour-distance tolerance.
//!
//! The region is grown on a *source* layer (whatever is topmost and opaque
//! under the click) and painted into a separate *target* drawing layer.
//! A pixel joins the region if its RGB colour is within `tolerance`
//! (Euclidean distance) of the seed colour. When the source is itself a
//! drawing layer, transparent pixels only match transparent pixels, so
//! clicking an empty area fills the enclosed empty region.

use std::collections::VecDeque;

use crate::color;
use crate::pixel_buffer::PixelBuffer;

/// Everything a fill needs; owned so it can be shipped to a worker thread.
#[derive(Debug, Clone)]
pub struct FillRequest {
    /// Layer the region is grown on
    pub source: PixelBuffer,
    /// Scene position of the source's top-left pixel
    pub source_origin: (i32, i32),
    /// Whether the source is a drawing layer (enables the transparency rule)
    pub source_is_drawing_layer: bool,
    /// Current content of the layer being painted
    pub target: PixelBuffer,
    /// Seed pixel in scene coordinates
    pub start: (i32, i32),
    /// Replacement colour
    pub fill_color: [u8; 3],
    /// Maximum colour distance from the seed colour
    pub tolerance: f64,
}

/// Region mask over the source buffer (row-major, `true` = filled).
///
/// Empty when the seed lies outside the source.
pub fn fill_mask(
    source: &PixelBuffer,
    start_x: i32,
    start_y: i32,
    tolerance: f64,
    drawing_layer: bool,
) -> Vec<bool> {
    let (width, height) = source.dimensions();
    let mut mask = vec![false; width as usize * height as usize];
    if !source.contains(start_x, start_y) {
        return mask;
    }

    let seed = source.pixel(start_x, start_y);
    let matches = |p: [u8; 4]| -> bool {
        if drawing_layer && (seed[3] == 0 || p[3] == 0) {
            return seed[3] == 0 && p[3] == 0;
        }
        color::color_distance([p[0], p[1], p[2]], [seed[0], seed[1], seed[2]]) <= tolerance
    };

    let index = |x: i32, y: i32| y as usize * width as usize + x as usize;
    let mut queue = VecDeque::new();
    mask[index(start_x, start_y)] = true;
    queue.push_back((start_x, start_y));

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !source.contains(nx, ny) {
                continue;
            }
            let i = index(nx, ny);
            if !mask[i] && matches(source.pixel(nx, ny)) {
                mask[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    mask
}

/// Run a fill and return the updated target buffer.
pub fn flood_fill(request: &FillRequest) -> PixelBuffer {
    let (ox, oy) = request.source_origin;
    let (sx, sy) = (request.start.0 - ox, request.start.1 - oy);
    let mask = fill_mask(
        &request.source,
        sx,
        sy,
        request.tolerance,
        request.source_is_drawing_layer,
    );

    let mut target = request.target.clone();
    let pixel = color::opaque(request.fill_color);
    let width = request.source.width() as usize;
    let mut filled = 0usize;
    for i in mask.iter().enumerate().filter_map(|(i, &m)| m.then_some(i)) {
        let x = (i % width) as i32 + ox;
        let y = (i / width) as i32 + oy;
        if target.contains(x, y) {
            target.put(x, y, pixel);
            filled += 1;
        }
    }

    log::debug!(
        "flood_fill: seed ({}, {}), tolerance {}, {} pixels",
        request.start.0,
        request.start.1,
        request.tolerance,
        filled
    );
    target
}
