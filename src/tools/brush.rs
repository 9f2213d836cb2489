//! Square-footprint tools: pen, eraser, gap drawer and magic wand.
//!
//! All of them work on a `pen_size x pen_size` square whose top-left corner
//! is the brush origin. Pixels outside the target buffer are skipped.

use crate::color;
use crate::layers::LayerRegistry;
use crate::pixel_buffer::PixelBuffer;

/// Top-left corner of the brush square for a pointer position.
pub fn brush_origin(px: f32, py: f32, pen_size: u32) -> (i32, i32) {
    let half = (pen_size / 2) as i32;
    (px.floor() as i32 - half, py.floor() as i32 - half)
}

/// Fill the brush square with an opaque colour.
pub fn draw_square(buffer: &mut PixelBuffer, x: i32, y: i32, pen_size: u32, rgb: [u8; 3]) {
    buffer.fill_rect(x, y, pen_size, pen_size, color::opaque(rgb));
}

/// Clear the brush square.
pub fn erase_square(buffer: &mut PixelBuffer, x: i32, y: i32, pen_size: u32) {
    buffer.clear_rect(x, y, pen_size, pen_size);
}

/// Paint only the pixels of the brush square that are transparent black on
/// every drawing layer. Returns the number of pixels painted.
pub fn gap_fill(
    registry: &mut LayerRegistry,
    target: &str,
    x: i32,
    y: i32,
    pen_size: u32,
    rgb: [u8; 3],
) -> usize {
    let size = pen_size as i32;
    let gaps: Vec<(i32, i32)> = (0..size)
        .flat_map(|j| (0..size).map(move |i| (x + i, y + j)))
        .filter(|&(px, py)| registry.all_drawing_layers_zero_at(px, py))
        .collect();

    let Some(buffer) = registry.buffer_mut(target) else {
        log::warn!("gap_fill: layer '{}' not found", target);
        return 0;
    };
    let pixel = color::opaque(rgb);
    let mut painted = 0;
    for (px, py) in gaps {
        if buffer.contains(px, py) {
            buffer.put(px, py, pixel);
            painted += 1;
        }
    }
    painted
}

/// Recolour the pixels of the brush square whose colour equals `overwrite`
/// (case-insensitive `#RRGGBB`). Returns the number of pixels recoloured.
///
/// Alpha is ignored when comparing, so a transparent pixel reads as
/// `#000000`.
pub fn wand_overwrite(
    buffer: &mut PixelBuffer,
    x: i32,
    y: i32,
    pen_size: u32,
    overwrite: &str,
    rgb: [u8; 3],
) -> usize {
    let Some(target) = color::parse_hex(overwrite) else {
        log::debug!("wand_overwrite: no overwrite colour picked");
        return 0;
    };
    let pixel = color::opaque(rgb);
    let size = pen_size as i32;
    let mut painted = 0;

    for j in 0..size {
        for i in 0..size {
            let (px, py) = (x + i, y + j);
            if !buffer.contains(px, py) {
                continue;
            }
            let [r, g, b, _] = buffer.pixel(px, py);
            if [r, g, b] == target {
                buffer.put(px, py, pixel);
                painted += 1;
            }
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];
    const GREEN: [u8; 3] = [0x44, 0xAA, 0x44];

    #[test]
    fn test_brush_origin_centers_square() {
        assert_eq!(brush_origin(10.7, 5.2, 10), (5, 0));
        assert_eq!(brush_origin(0.5, 0.5, 1), (0, 0));
        assert_eq!(brush_origin(1.0, 1.0, 4), (-1, -1));
    }

    #[test]
    fn test_draw_and_erase_square() {
        let mut buf = PixelBuffer::new(8, 8);
        draw_square(&mut buf, 2, 2, 3, RED);
        assert_eq!(buf.opaque_count(), 9);
        assert_eq!(buf.pixel(4, 4), [255, 0, 0, 255]);
        erase_square(&mut buf, 3, 3, 3);
        assert_eq!(buf.opaque_count(), 5);
    }

    #[test]
    fn test_gap_fill_never_overwrites_any_drawing_layer() {
        let mut reg = LayerRegistry::new();
        reg.add_layer("Drawing Layer 1", PixelBuffer::new(6, 6), false);
        reg.add_layer("Drawing Layer 2", PixelBuffer::new(6, 6), false);
        reg.add_layer("Source Image", PixelBuffer::new(6, 6), false);
        reg.buffer_mut("Drawing Layer 1").unwrap().put(1, 1, [9, 9, 9, 255]);
        reg.buffer_mut("Drawing Layer 2").unwrap().put(2, 2, [8, 8, 8, 255]);
        reg.buffer_mut("Source Image")
            .unwrap()
            .fill_rect(0, 0, 6, 6, [1, 2, 3, 255]);

        let painted = gap_fill(&mut reg, "Drawing Layer 1", 0, 0, 3, GREEN);
        assert_eq!(painted, 7);

        let target = reg.buffer("Drawing Layer 1").unwrap();
        assert_eq!(target.pixel(1, 1), [9, 9, 9, 255], "own paint untouched");
        assert!(target.is_zero_at(2, 2), "other layer's paint blocks the gap");
        assert_eq!(target.pixel(0, 0), [0x44, 0xAA, 0x44, 255]);
        assert_eq!(reg.buffer("Drawing Layer 2").unwrap().opaque_count(), 1);
    }

    #[test]
    fn test_gap_fill_unknown_layer() {
        let mut reg = LayerRegistry::new();
        assert_eq!(gap_fill(&mut reg, "Drawing Layer 9", 0, 0, 3, GREEN), 0);
    }

    #[test]
    fn test_wand_overwrite_is_local() {
        let mut buf = PixelBuffer::new(10, 10);
        buf.fill_rect(0, 0, 10, 10, [255, 0, 0, 255]);
        buf.put(1, 1, [0, 0, 255, 255]);

        let painted = wand_overwrite(&mut buf, 0, 0, 3, "#ff0000", GREEN);
        assert_eq!(painted, 8);
        assert_eq!(buf.pixel(1, 1), [0, 0, 255, 255], "non-matching colour kept");
        assert_eq!(buf.pixel(2, 2), [0x44, 0xAA, 0x44, 255]);
        assert_eq!(buf.pixel(3, 3), [255, 0, 0, 255], "outside the square");
        assert_eq!(buf.pixel(9, 9), [255, 0, 0, 255]);
    }

    #[test]
    fn test_wand_without_pick_is_noop() {
        let mut buf = PixelBuffer::new(4, 4);
        assert_eq!(wand_overwrite(&mut buf, 0, 0, 4, "", RED), 0);
        assert_eq!(buf.opaque_count(), 0);
    }
}
