//! RGBA pixel buffers, the unit of mutation for every layer.
//!
//! A thin wrapper around [`image::RgbaImage`] that adds clipped rectangle
//! operations with signed coordinates. Brush squares routinely hang off the
//! edge of the canvas; everything outside the buffer is silently ignored and
//! reads back as transparent black.

use image::{Rgba, RgbaImage};

use crate::color;
use crate::error::EditorError;

/// Fully transparent black.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A width x height grid of RGBA 8-bit pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Create a transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Wrap raw RGBA bytes (row-major, 4 bytes per pixel).
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EditorError> {
        let expected = width as usize * height as usize * 4;
        let found = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(Self::from_image)
            .ok_or(EditorError::BufferSize {
                width,
                height,
                expected,
                found,
            })
    }

    /// Wrap an existing image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Consume into raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }

    /// True if `(x, y)` lies inside the buffer.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Pixel at `(x, y)`, transparent black outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        if self.contains(x, y) {
            self.image.get_pixel(x as u32, y as u32).0
        } else {
            TRANSPARENT
        }
    }

    /// Set one pixel; ignored outside the buffer.
    pub fn put(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if self.contains(x, y) {
            self.image.put_pixel(x as u32, y as u32, Rgba(rgba));
        }
    }

    /// Uppercase hex of the pixel's RGB (alpha ignored).
    pub fn hex_at(&self, x: i32, y: i32) -> String {
        let [r, g, b, _] = self.pixel(x, y);
        color::to_hex([r, g, b])
    }

    /// True if all four channels are zero at `(x, y)`.
    pub fn is_zero_at(&self, x: i32, y: i32) -> bool {
        self.pixel(x, y) == TRANSPARENT
    }

    /// Fill the `width x height` rectangle at `(x, y)`, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: [u8; 4]) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgba(rgba));
            }
        }
    }

    /// Clear the rectangle at `(x, y)` to transparent black.
    pub fn clear_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.fill_rect(x, y, width, height, TRANSPARENT);
    }

    /// Clear the whole buffer.
    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba(TRANSPARENT));
    }

    /// Replace the content with `other`, adopting its dimensions.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        self.image.clone_from(&other.image);
    }

    /// True if both buffers have the same dimensions and bytes.
    pub fn same_pixels(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions() && self.as_raw() == other.as_raw()
    }

    /// Number of pixels with non-zero alpha.
    pub fn opaque_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] != 0).count()
    }

    /// Iterate `(x, y, rgba)` over every pixel.
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, [u8; 4])> + '_ {
        self.image.enumerate_pixels().map(|(x, y, p)| (x, y, p.0))
    }

    /// Mutable access to every pixel's channels.
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8; 4]> + '_ {
        self.image.pixels_mut().map(|p| &mut p.0)
    }

    fn clip(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(width)).min(i64::from(self.width()));
        let y1 = (i64::from(y) + i64::from(height)).min(i64::from(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}
