//! Layer registry: name to buffer mapping, display order and selection.
//!
//! The layer name is the only identity key. Layers are kept in insertion
//! order; display order is tracked separately for drawing layers and for
//! everything else, with the first entry of each sequence being the topmost.
//! Drawing layers always render above non-drawing layers.

use crate::color;
use crate::constants::{DEFAULT_HEX_COLOR, DRAWING_LAYER_PREFIX, FIRST_DRAWING_LAYER};
use crate::pixel_buffer::PixelBuffer;

use super::settings::{LayerProperty, LayerSettings};

/// True if `name` denotes a user-paintable drawing layer.
pub fn is_drawing_layer(name: &str) -> bool {
    name.starts_with(DRAWING_LAYER_PREFIX)
}

/// Number of a `Drawing Layer N` name.
fn drawing_layer_number(name: &str) -> Option<u32> {
    name.strip_prefix(DRAWING_LAYER_PREFIX)?.trim().parse().ok()
}

/// A registered layer.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique layer name
    pub name: String,
    /// Pixel content
    pub buffer: PixelBuffer,
    /// Display / interaction settings
    pub settings: LayerSettings,
    /// Position of the buffer's top-left pixel in scene coordinates.
    /// Non-zero only for patch layers smaller than the scene.
    pub origin: (i32, i32),
}

impl Layer {
    /// Pixel at scene coordinates.
    pub fn pixel_at(&self, x: i32, y: i32) -> [u8; 4] {
        self.buffer.pixel(x - self.origin.0, y - self.origin.1)
    }
}

/// Result of a colour lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSample {
    /// Layer the colour was found on
    pub layer: String,
    /// Uppercase `#RRGGBB`
    pub hex: String,
}

/// Owns every layer of the current scene.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    drawing_order: Vec<String>,
    other_order: Vec<String>,
    selected_drawing: Option<String>,
    selected_other: Option<String>,
}

impl LayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer with default settings.
    ///
    /// Drawing layers are appended to the drawing order, everything else to
    /// the other order. Re-registering an existing name replaces its buffer
    /// and keeps its settings and position.
    pub fn add_layer(&mut self, name: &str, buffer: PixelBuffer, discretizable: bool) {
        if let Some(layer) = self.layer_mut(name) {
            log::debug!("LayerRegistry: replacing buffer of '{}'", name);
            layer.buffer = buffer;
            return;
        }

        log::debug!(
            "LayerRegistry: added '{}' ({}x{}, discretizable={})",
            name,
            buffer.width(),
            buffer.height(),
            discretizable
        );
        self.layers.push(Layer {
            name: name.to_string(),
            buffer,
            settings: LayerSettings::new(discretizable),
            origin: (0, 0),
        });
        if is_drawing_layer(name) {
            self.drawing_order.push(name.to_string());
        } else {
            self.other_order.push(name.to_string());
        }
    }

    /// Remove a layer, fixing up order and selection.
    pub fn remove_layer(&mut self, name: &str) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.name == name)?;
        let layer = self.layers.remove(index);
        self.drawing_order.retain(|n| n != name);
        self.other_order.retain(|n| n != name);

        if self.selected_drawing.as_deref() == Some(name) {
            self.selected_drawing = self.drawing_order.first().cloned();
        }
        if self.selected_other.as_deref() == Some(name) {
            self.selected_other = self.other_order.first().cloned();
        }
        log::debug!("LayerRegistry: removed '{}'", name);
        Some(layer)
    }

    /// Drop every layer and selection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of registered layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if no layer is registered.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// True if a layer with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    /// Layers in insertion order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Look up a layer.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Look up a layer mutably.
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Buffer of a layer.
    pub fn buffer(&self, name: &str) -> Option<&PixelBuffer> {
        self.layer(name).map(|l| &l.buffer)
    }

    /// Mutable buffer of a layer.
    pub fn buffer_mut(&mut self, name: &str) -> Option<&mut PixelBuffer> {
        self.layer_mut(name).map(|l| &mut l.buffer)
    }

    /// Settings of a layer.
    pub fn settings(&self, name: &str) -> Option<&LayerSettings> {
        self.layer(name).map(|l| &l.settings)
    }

    /// Mutable settings of a layer.
    pub fn settings_mut(&mut self, name: &str) -> Option<&mut LayerSettings> {
        self.layer_mut(name).map(|l| &mut l.settings)
    }

    /// Drawing layers, topmost first.
    pub fn drawing_order(&self) -> &[String] {
        &self.drawing_order
    }

    /// Non-drawing layers, topmost first.
    pub fn other_order(&self) -> &[String] {
        &self.other_order
    }

    /// Currently selected drawing layer.
    pub fn selected_drawing_layer(&self) -> Option<&str> {
        self.selected_drawing.as_deref()
    }

    /// Currently selected non-drawing layer.
    pub fn selected_other_layer(&self) -> Option<&str> {
        self.selected_other.as_deref()
    }

    /// Select a layer and move it to the front of its display sequence.
    ///
    /// Returns false if the layer does not exist.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            log::warn!("LayerRegistry: cannot select unknown layer '{}'", name);
            return false;
        }

        let order = if is_drawing_layer(name) {
            self.selected_drawing = Some(name.to_string());
            &mut self.drawing_order
        } else {
            self.selected_other = Some(name.to_string());
            &mut self.other_order
        };
        if let Some(pos) = order.iter().position(|n| n == name) {
            let entry = order.remove(pos);
            order.insert(0, entry);
        }

        log::debug!("LayerRegistry: selected '{}'", name);
        true
    }

    /// Name for the next drawing layer (`Drawing Layer N`, N one past the highest).
    pub fn next_drawing_layer_name(&self) -> String {
        let next = self
            .drawing_order
            .iter()
            .filter_map(|n| drawing_layer_number(n))
            .max()
            .map_or(1, |n| n + 1);
        format!("{} {}", DRAWING_LAYER_PREFIX, next)
    }

    /// Topmost layer with non-zero opacity satisfying the property filters.
    ///
    /// Every `required` property must be set and no `excluded` property may
    /// be set. Drawing layers are scanned first. Falls back to the topmost
    /// drawing layer when nothing matches.
    pub fn active_layer(
        &self,
        required: &[LayerProperty],
        excluded: &[LayerProperty],
    ) -> Option<&str> {
        self.drawing_order
            .iter()
            .chain(self.other_order.iter())
            .filter_map(|name| self.layer(name))
            .find(|layer| {
                let s = &layer.settings;
                s.opacity > 0
                    && required.iter().all(|&p| s.has(p))
                    && !excluded.iter().any(|&p| s.has(p))
            })
            .map(|layer| layer.name.as_str())
            .or_else(|| self.drawing_order.first().map(String::as_str))
    }

    /// Topmost opaque colour at scene coordinates.
    ///
    /// Layers with opacity 0 and pixels with alpha 0 are skipped. Falls back
    /// to `Drawing Layer 1` / `#000000`.
    pub fn color_at(&self, x: i32, y: i32) -> ColorSample {
        self.drawing_order
            .iter()
            .chain(self.other_order.iter())
            .filter_map(|name| self.layer(name))
            .filter(|layer| layer.settings.opacity > 0)
            .find_map(|layer| {
                let [r, g, b, a] = layer.pixel_at(x, y);
                (a != 0).then(|| ColorSample {
                    layer: layer.name.clone(),
                    hex: color::to_hex([r, g, b]),
                })
            })
            .unwrap_or_else(|| ColorSample {
                layer: FIRST_DRAWING_LAYER.to_string(),
                hex: DEFAULT_HEX_COLOR.to_string(),
            })
    }

    /// True if every drawing layer is transparent black at `(x, y)`.
    pub fn all_drawing_layers_zero_at(&self, x: i32, y: i32) -> bool {
        self.layers
            .iter()
            .filter(|l| is_drawing_layer(&l.name))
            .all(|l| l.pixel_at(x, y) == [0, 0, 0, 0])
    }

    /// Alpha-composite all visible layers into one buffer.
    ///
    /// Non-drawing layers go at the bottom, drawing layers on top; within
    /// each group the first entry of the display order is topmost. Each
    /// layer's pixel alpha is scaled by its opacity.
    pub fn flatten(&self, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        let bottom_up = self
            .other_order
            .iter()
            .rev()
            .chain(self.drawing_order.iter().rev())
            .filter_map(|name| self.layer(name))
            .filter(|l| l.settings.visible && l.settings.opacity > 0);

        for layer in bottom_up {
            let opacity = layer.settings.alpha();
            for y in 0..height as i32 {
                for x in 0..width as i32 {
                    let src = layer.pixel_at(x, y);
                    if src[3] == 0 {
                        continue;
                    }
                    let dst = out.pixel(x, y);
                    out.put(x, y, blend_over(src, dst, opacity));
                }
            }
        }
        out
    }
}

/// Source-over compositing of `src` (alpha scaled by `opacity`) onto `dst`.
fn blend_over(src: [u8; 4], dst: [u8; 4], opacity: f32) -> [u8; 4] {
    let sa = f32::from(src[3]) / 255.0 * opacity;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (f32::from(src[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}
