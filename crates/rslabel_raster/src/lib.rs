//! Raster layer for rslabel.
//!
//! Band lookup tables for the supported satellite products, raw 16-bit
//! scenes, `.npy` band loading, and the conversion of raw bands into
//! displayable 8-bit RGBA: percentile / min-max / histogram normalization
//! and the NDVI, NDWI and agriculture composites.
//!
//! Everything here is a pure function of its inputs and safe to run on a
//! background thread.

pub mod bands;
pub mod error;
pub mod index;
pub mod normalize;
pub mod npy;
pub mod scene;

pub use bands::{BandInfo, BandRoles, SatelliteType};
pub use error::RasterError;
pub use index::IndexKind;
pub use normalize::{NormType, Rgba8Raster, normalize};
pub use scene::{RasterBand, RawScene};
