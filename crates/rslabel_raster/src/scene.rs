//! Raw multi-band scenes.
//!
//! A scene is the set of 16-bit bands loaded for one acquisition. Bands are
//! immutable once inserted and shared cheaply (`Arc`) with render workers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bands::SatelliteType;
use crate::error::RasterError;
use crate::index::{self, IndexKind};
use crate::normalize::{self, NormType, Rgba8Raster};

/// An immutable grid of 16-bit samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBand {
    width: u32,
    height: u32,
    samples: Arc<[u16]>,
}

impl RasterBand {
    /// Create a band, checking that the sample count matches the dimensions.
    pub fn new(width: u32, height: u32, samples: Vec<u16>) -> Result<Self, RasterError> {
        if samples.len() != width as usize * height as usize {
            return Err(RasterError::dimension_mismatch(samples.len(), width, height));
        }
        Ok(Self {
            width,
            height,
            samples: samples.into(),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw samples.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }
}

/// The bands of one loaded acquisition.
#[derive(Debug, Clone)]
pub struct RawScene {
    satellite: SatelliteType,
    width: u32,
    height: u32,
    bands: BTreeMap<String, RasterBand>,
}

impl RawScene {
    /// Create an empty scene of the given dimensions.
    pub fn new(satellite: SatelliteType, width: u32, height: u32) -> Self {
        Self {
            satellite,
            width,
            height,
            bands: BTreeMap::new(),
        }
    }

    /// Product the scene was acquired with.
    pub fn satellite(&self) -> SatelliteType {
        self.satellite
    }

    /// Scene width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Scene height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Insert a band under its lowercase key, replacing any previous one.
    ///
    /// The key must exist in the product's band table and the band must
    /// match the scene dimensions.
    pub fn insert_band(&mut self, key: &str, band: RasterBand) -> Result<(), RasterError> {
        let info = self
            .satellite
            .band(key)
            .ok_or_else(|| RasterError::UnknownBand {
                band: key.to_string(),
                satellite: self.satellite,
            })?;

        if band.width != self.width || band.height != self.height {
            return Err(RasterError::dimension_mismatch(
                band.samples.len(),
                self.width,
                self.height,
            ));
        }

        log::debug!(
            "RawScene: inserted {} ({}, {} m)",
            info.key,
            info.name,
            info.resolution_meters
        );
        self.bands.insert(info.key.to_string(), band);
        Ok(())
    }

    /// Look up a loaded band.
    pub fn band(&self, key: &str) -> Result<&RasterBand, RasterError> {
        self.bands
            .get(&key.to_ascii_lowercase())
            .ok_or_else(|| RasterError::MissingBand {
                band: key.to_string(),
            })
    }

    /// Keys of the loaded bands, sorted.
    pub fn band_keys(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    /// Bands feeding the true-colour composite, in R, G, B order.
    pub fn true_color_bands(&self) -> Result<Vec<RasterBand>, RasterError> {
        self.resolve(&self.satellite.roles().true_color)
    }

    /// Bands feeding an index composite, in formula order.
    pub fn index_bands(&self, kind: IndexKind) -> Result<Vec<RasterBand>, RasterError> {
        let keys = kind
            .band_keys(&self.satellite.roles())
            .ok_or(RasterError::UnsupportedComposite {
                composite: kind.name(),
                satellite: self.satellite,
            })?;
        self.resolve(&keys)
    }

    /// Render the true-colour Source Image.
    pub fn render_true_color(&self, norm: NormType) -> Result<Rgba8Raster, RasterError> {
        let bands = self.true_color_bands()?;
        let slices: Vec<&[u16]> = bands.iter().map(RasterBand::samples).collect();
        normalize::normalize(&slices, self.width, self.height, norm)
    }

    /// Render an index composite.
    pub fn render_index(&self, kind: IndexKind) -> Result<Rgba8Raster, RasterError> {
        let bands = self.index_bands(kind)?;
        let slices: Vec<&[u16]> = bands.iter().map(RasterBand::samples).collect();
        index::compute(kind, &slices, self.width, self.height)
    }

    fn resolve(&self, keys: &[&str]) -> Result<Vec<RasterBand>, RasterError> {
        keys.iter().map(|key| self.band(key).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(samples: &[u16]) -> RasterBand {
        RasterBand::new(samples.len() as u32, 1, samples.to_vec()).unwrap()
    }

    #[test]
    fn test_band_dimension_check() {
        assert!(RasterBand::new(2, 2, vec![0; 3]).is_err());
        assert!(RasterBand::new(2, 2, vec![0; 4]).is_ok());
    }

    #[test]
    fn test_insert_rejects_unknown_band() {
        let mut scene = RawScene::new(SatelliteType::Landsat5sr, 2, 1);
        assert!(matches!(
            scene.insert_band("b8a", band(&[1, 2])),
            Err(RasterError::UnknownBand { .. })
        ));
    }

    #[test]
    fn test_insert_rejects_wrong_size() {
        let mut scene = RawScene::new(SatelliteType::Sentinels2l2a, 3, 1);
        assert!(matches!(
            scene.insert_band("b4", band(&[1, 2])),
            Err(RasterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut scene = RawScene::new(SatelliteType::Sentinels2l2a, 2, 1);
        scene.insert_band("B8A", band(&[1, 2])).unwrap();
        assert!(scene.band("b8a").is_ok());
        assert!(scene.band("B8A").is_ok());
        assert_eq!(scene.band_keys().collect::<Vec<_>>(), vec!["b8a"]);
    }

    #[test]
    fn test_render_true_color_requires_bands() {
        let mut scene = RawScene::new(SatelliteType::Sentinels2l2a, 2, 1);
        scene.insert_band("b4", band(&[0, 10])).unwrap();
        assert!(matches!(
            scene.render_true_color(NormType::MinMax),
            Err(RasterError::MissingBand { .. })
        ));

        scene.insert_band("b3", band(&[10, 0])).unwrap();
        scene.insert_band("b2", band(&[5, 5])).unwrap();
        let image = scene.render_true_color(NormType::MinMax).unwrap();
        assert_eq!(image.data, vec![0, 255, 0, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn test_ndvi_scenario() {
        let mut scene = RawScene::new(SatelliteType::Sentinels2l2a, 2, 1);
        scene.insert_band("b8", band(&[100, 200])).unwrap();
        scene.insert_band("b4", band(&[50, 50])).unwrap();
        let ndvi = scene.render_index(IndexKind::Ndvi).unwrap();
        assert_eq!(ndvi.data, vec![85, 85, 85, 255, 153, 153, 153, 255]);
    }

    #[test]
    fn test_unsupported_composite() {
        let scene = RawScene::new(SatelliteType::Landsat5toa, 2, 1);
        assert!(matches!(
            scene.render_index(IndexKind::Ndwi),
            Err(RasterError::UnsupportedComposite { .. })
        ));
    }
}
