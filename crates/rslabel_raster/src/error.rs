//! Error types for raster operations.

use thiserror::Error;

use crate::bands::SatelliteType;

/// Errors that can occur while loading or converting raw rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// I/O error while reading band files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The `.npy` payload could not be decoded as `u16` samples
    #[error("NumPy read error: {0}")]
    Npy(#[from] ndarray_npy::ReadNpyError),

    /// Number of bands passed to an operation is outside its accepted range
    #[error("Expected {expected} bands, got {found}")]
    BandCount {
        /// Accepted range, for display
        expected: &'static str,
        /// Number of bands supplied
        found: usize,
    },

    /// A band's sample count does not match the raster dimensions
    #[error("Band has {found} samples, expected {expected} ({width}x{height})")]
    DimensionMismatch {
        /// Expected sample count
        expected: usize,
        /// Actual sample count
        found: usize,
        /// Raster width
        width: u32,
        /// Raster height
        height: u32,
    },

    /// A band required by a composite is not present in the scene
    #[error("Band '{band}' not loaded")]
    MissingBand {
        /// Band key (`"b8a"`)
        band: String,
    },

    /// The band key is not part of the product's band table
    #[error("Unknown band '{band}' for {satellite:?}")]
    UnknownBand {
        /// Band key that was looked up
        band: String,
        /// Product whose table was searched
        satellite: SatelliteType,
    },

    /// The product has no band mapping for the requested composite
    #[error("{composite} composite is not available for {satellite:?}")]
    UnsupportedComposite {
        /// Composite name
        composite: &'static str,
        /// Product of the scene
        satellite: SatelliteType,
    },

    /// Array shape cannot be interpreted as a single band
    #[error("Unsupported array shape {shape:?} (expected 2D height x width)")]
    UnsupportedShape {
        /// Shape as read from the file
        shape: Vec<usize>,
    },
}

impl RasterError {
    /// Create a dimension mismatch error for a band.
    pub fn dimension_mismatch(found: usize, width: u32, height: u32) -> Self {
        Self::DimensionMismatch {
            expected: width as usize * height as usize,
            found,
            width,
            height,
        }
    }
}
