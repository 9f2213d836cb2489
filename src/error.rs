//! Error types for editor operations.

use rslabel_raster::RasterError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while editing, importing or exporting layers.
#[derive(Error, Debug)]
pub enum EditorError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw band or composite error
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Overlay image could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Label array could not be written as `.npy`
    #[error("NumPy write error: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// Configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Layer name is not registered
    #[error("Unknown layer '{name}'")]
    UnknownLayer {
        /// Name that was looked up
        name: String,
    },

    /// Raw RGBA data length does not match the buffer dimensions
    #[error("Buffer of {width}x{height} needs {expected} bytes, got {found}")]
    BufferSize {
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        found: usize,
    },

    /// Layers passed to one operation differ in size
    #[error("Layer '{layer}' is {found_width}x{found_height}, expected {width}x{height}")]
    DimensionMismatch {
        /// Offending layer
        layer: String,
        /// Expected width
        width: u32,
        /// Expected height
        height: u32,
        /// Actual width
        found_width: u32,
        /// Actual height
        found_height: u32,
    },

    /// Export requested without any layer
    #[error("No layers selected for export")]
    NoLayers,

    /// A background worker thread could not be started
    #[error("Failed to spawn {kind} worker: {message}")]
    WorkerSpawn {
        /// Worker kind
        kind: &'static str,
        /// OS error text
        message: String,
    },
}

impl EditorError {
    /// Create an unknown layer error.
    pub fn unknown_layer(name: impl Into<String>) -> Self {
        Self::UnknownLayer { name: name.into() }
    }
}
