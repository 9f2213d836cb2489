//! Layers: named pixel buffers with display settings and ordering.

mod registry;
mod settings;

pub use registry::{ColorSample, Layer, LayerRegistry, is_drawing_layer};
pub use settings::{LayerProperty, LayerSettings};
