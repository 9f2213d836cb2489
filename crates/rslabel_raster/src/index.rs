//! Index composites: NDVI, NDWI and the agriculture false-colour image.

use serde::{Deserialize, Serialize};

use crate::bands::BandRoles;
use crate::error::RasterError;
use crate::normalize::{self, NormType, Rgba8Raster, check_dimensions};

/// Kind of index composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Normalized difference vegetation index, `(NIR - RED) / (NIR + RED)`
    Ndvi,
    /// Normalized difference water index, `(BLUE - NIR) / (BLUE + NIR)`
    Ndwi,
    /// SWIR / NIR / BLUE composite
    Agriculture,
}

impl IndexKind {
    /// Display name, also used as the layer name.
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "NDVI",
            IndexKind::Ndwi => "NDWI",
            IndexKind::Agriculture => "Agriculture",
        }
    }

    /// Get all index kinds.
    pub fn all() -> &'static [IndexKind] {
        &[IndexKind::Ndvi, IndexKind::Ndwi, IndexKind::Agriculture]
    }

    /// Band keys in formula order, or `None` if the product lacks a mapping.
    pub fn band_keys(&self, roles: &BandRoles) -> Option<Vec<&'static str>> {
        match self {
            IndexKind::Ndvi => roles.ndvi.map(|keys| keys.to_vec()),
            IndexKind::Ndwi => roles.ndwi.map(|keys| keys.to_vec()),
            IndexKind::Agriculture => roles.agriculture.map(|keys| keys.to_vec()),
        }
    }
}

/// Compute an index composite from bands given in formula order.
pub fn compute(
    kind: IndexKind,
    bands: &[&[u16]],
    width: u32,
    height: u32,
) -> Result<Rgba8Raster, RasterError> {
    match (kind, bands) {
        (IndexKind::Ndvi | IndexKind::Ndwi, [a, b]) => normalized_difference(a, b, width, height),
        (IndexKind::Agriculture, [swir, nir, blue]) => {
            agriculture(swir, nir, blue, width, height)
        }
        (IndexKind::Agriculture, _) => Err(RasterError::BandCount {
            expected: "3",
            found: bands.len(),
        }),
        _ => Err(RasterError::BandCount {
            expected: "2",
            found: bands.len(),
        }),
    }
}

/// Greyscale `(a - b) / (a + b)` scaled by 255.
///
/// Negative ratios clamp to 0 and `0 / 0` maps to 0. Values are floored.
pub fn normalized_difference(
    a: &[u16],
    b: &[u16],
    width: u32,
    height: u32,
) -> Result<Rgba8Raster, RasterError> {
    check_dimensions(&[a, b], width, height)?;

    let plane: Vec<u8> = a
        .iter()
        .zip(b.iter())
        .map(|(&a, &b)| {
            let sum = f64::from(a) + f64::from(b);
            if sum == 0.0 {
                return 0;
            }
            let diff = f64::from(a) - f64::from(b);
            (diff * 255.0 / sum).floor().clamp(0.0, 255.0) as u8
        })
        .collect();

    Ok(Rgba8Raster::from_planes(&[plane], width, height))
}

/// SWIR/NIR/BLUE false-colour composite stretched at the 1st/99th percentile.
pub fn agriculture(
    swir: &[u16],
    nir: &[u16],
    blue: &[u16],
    width: u32,
    height: u32,
) -> Result<Rgba8Raster, RasterError> {
    normalize::normalize(&[swir, nir, blue], width, height, NormType::Percentile1And99)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::SatelliteType;

    #[test]
    fn test_ndvi_values() {
        let out = normalized_difference(&[100, 200], &[50, 50], 2, 1).unwrap();
        assert_eq!(out.data, vec![85, 85, 85, 255, 153, 153, 153, 255]);
    }

    #[test]
    fn test_zero_over_zero_is_zero() {
        let out = normalized_difference(&[0], &[0], 1, 1).unwrap();
        assert_eq!(out.data, vec![0, 0, 0, 255]);
    }

    #[test]
    fn test_negative_ratio_clamps() {
        let out = normalized_difference(&[10, 100], &[100, 0], 2, 1).unwrap();
        assert_eq!(out.data, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_band_keys_per_product() {
        let roles = SatelliteType::Sentinels2l1c.roles();
        assert_eq!(IndexKind::Ndvi.band_keys(&roles), Some(vec!["b5", "b4"]));
        let roles = SatelliteType::Landsat8sr.roles();
        assert_eq!(IndexKind::Agriculture.band_keys(&roles), None);
    }

    #[test]
    fn test_compute_checks_band_count() {
        let band = [1u16, 2];
        assert!(matches!(
            compute(IndexKind::Ndvi, &[&band], 2, 1),
            Err(RasterError::BandCount { found: 1, .. })
        ));
        assert!(matches!(
            compute(IndexKind::Agriculture, &[&band, &band], 2, 1),
            Err(RasterError::BandCount { found: 2, .. })
        ));
    }

    #[test]
    fn test_agriculture_channel_order() {
        let swir = [0u16, 1000];
        let nir = [1000u16, 0];
        let blue = [0u16, 0];
        let out = compute(IndexKind::Agriculture, &[&swir, &nir, &blue], 2, 1).unwrap();
        assert_eq!(&out.data[0..4], &[0, 255, 0, 255]);
        assert_eq!(&out.data[4..8], &[255, 0, 0, 255]);
    }
}
