//! rslabel - Satellite Imagery Labelling Tool
//!
//! Pixel-level labelling of multispectral satellite scenes: raw bands are
//! rendered into a Source Image and index composites, classes are painted
//! onto drawing layers with a set of brush tools, and the result exports as
//! a class-id array.
//!
//! The [`Editor`] is the single entry point a front-end drives.

pub mod color;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod export;
pub mod history;
pub mod keybindings;
pub mod kmeans;
pub mod layers;
pub mod model;
pub mod pixel_buffer;
pub mod tools;
pub mod workers;

pub use config::{AppConfig, ConfigError, LogLevel, UserPreferences};
pub use editor::Editor;
pub use error::EditorError;
pub use history::{HistoryAction, HistoryLog};
pub use keybindings::{Action, KeyBinding, KeyBindings};
pub use layers::{LayerRegistry, LayerSettings};
pub use model::{ClassTable, LabelClass};
pub use pixel_buffer::PixelBuffer;
pub use tools::{ActiveTool, ToolKind};

pub use rslabel_raster::{IndexKind, NormType, RasterBand, RawScene, SatelliteType};
