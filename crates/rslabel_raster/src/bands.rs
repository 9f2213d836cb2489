//! Band lookup table for the supported satellite products.
//!
//! Each product lists its spectral bands in file order together with the
//! nominal ground resolution and central wavelength. The `BandRoles` lookup
//! answers which band feeds which channel of a composite; these mappings are
//! fixed per product and consumed read-only by the normalization and index
//! code.

use serde::{Deserialize, Serialize};

/// Satellite product a scene was acquired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SatelliteType {
    /// Sentinel-2 Level-2A (bottom of atmosphere)
    #[default]
    Sentinels2l2a,
    /// Sentinel-2 Level-1C (top of atmosphere)
    Sentinels2l1c,
    /// Landsat-8 top of atmosphere reflectance
    Landsat8toa,
    /// Landsat-8 surface reflectance
    Landsat8sr,
    /// Landsat-5 top of atmosphere reflectance
    Landsat5toa,
    /// Landsat-5 surface reflectance
    Landsat5sr,
}

impl SatelliteType {
    /// Get the display name for this product.
    pub fn name(&self) -> &'static str {
        match self {
            SatelliteType::Sentinels2l2a => "Sentinel-2 L2A",
            SatelliteType::Sentinels2l1c => "Sentinel-2 L1C",
            SatelliteType::Landsat8toa => "Landsat-8 TOA",
            SatelliteType::Landsat8sr => "Landsat-8 SR",
            SatelliteType::Landsat5toa => "Landsat-5 TOA",
            SatelliteType::Landsat5sr => "Landsat-5 SR",
        }
    }

    /// Get all supported products.
    pub fn all() -> &'static [SatelliteType] {
        &[
            SatelliteType::Sentinels2l2a,
            SatelliteType::Sentinels2l1c,
            SatelliteType::Landsat8toa,
            SatelliteType::Landsat8sr,
            SatelliteType::Landsat5toa,
            SatelliteType::Landsat5sr,
        ]
    }

    /// Ordered band list for this product.
    pub fn bands(&self) -> &'static [BandInfo] {
        match self {
            SatelliteType::Sentinels2l2a => SENTINEL2_L2A_BANDS,
            SatelliteType::Sentinels2l1c => SENTINEL2_L1C_BANDS,
            SatelliteType::Landsat8toa => LANDSAT8_TOA_BANDS,
            SatelliteType::Landsat8sr => LANDSAT8_SR_BANDS,
            SatelliteType::Landsat5toa | SatelliteType::Landsat5sr => LANDSAT5_BANDS,
        }
    }

    /// Look up a band by its key (e.g. `"b8a"`), case-insensitive.
    pub fn band(&self, key: &str) -> Option<&'static BandInfo> {
        self.bands()
            .iter()
            .find(|band| band.key.eq_ignore_ascii_case(key))
    }

    /// Fixed band roles used to build composites for this product.
    pub fn roles(&self) -> BandRoles {
        match self {
            SatelliteType::Sentinels2l2a => BandRoles {
                true_color: ["b4", "b3", "b2"],
                ndvi: Some(["b8", "b4"]),
                ndwi: Some(["b2", "b8a"]),
                agriculture: Some(["b11", "b8", "b2"]),
            },
            SatelliteType::Sentinels2l1c => BandRoles {
                true_color: ["b4", "b3", "b2"],
                ndvi: Some(["b5", "b4"]),
                ndwi: Some(["b2", "b8a"]),
                agriculture: Some(["b11", "b8", "b2"]),
            },
            SatelliteType::Landsat8toa => BandRoles {
                true_color: ["b4", "b3", "b2"],
                ndvi: Some(["b5", "b4"]),
                ndwi: Some(["b2", "b5"]),
                agriculture: Some(["b6", "b5", "b2"]),
            },
            SatelliteType::Landsat8sr => BandRoles {
                true_color: ["b4", "b3", "b2"],
                ndvi: Some(["b5", "b4"]),
                ndwi: None,
                agriculture: None,
            },
            SatelliteType::Landsat5toa | SatelliteType::Landsat5sr => BandRoles {
                true_color: ["b3", "b2", "b1"],
                ndvi: None,
                ndwi: None,
                agriculture: None,
            },
        }
    }
}

/// Static description of a single spectral band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInfo {
    /// Lookup key used by scenes and band roles (`"b1"`, `"b8a"`, ...)
    pub key: &'static str,
    /// Display name (`"Band 8A"`)
    pub name: &'static str,
    /// Nominal ground resolution in meters
    pub resolution_meters: u32,
    /// Central wavelength in nanometers
    pub central_wavelength_nm: f32,
    /// Human-readable description
    pub description: &'static str,
}

/// Which bands feed which composite channel.
///
/// Index composites name their operands in formula order: NDVI is
/// `(NIR - RED) / (NIR + RED)` with `[NIR, RED]`, NDWI is
/// `(BLUE - NIR) / (BLUE + NIR)` with `[BLUE, NIR]`. Agriculture is a
/// `[SWIR, NIR, BLUE]` false-colour composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRoles {
    /// Red, green, blue
    pub true_color: [&'static str; 3],
    /// NIR, red
    pub ndvi: Option<[&'static str; 2]>,
    /// Blue, NIR
    pub ndwi: Option<[&'static str; 2]>,
    /// SWIR, NIR, blue
    pub agriculture: Option<[&'static str; 3]>,
}

const fn band(
    key: &'static str,
    name: &'static str,
    resolution_meters: u32,
    central_wavelength_nm: f32,
    description: &'static str,
) -> BandInfo {
    BandInfo {
        key,
        name,
        resolution_meters,
        central_wavelength_nm,
        description,
    }
}

const VNIR: &str = "Visible and Near Infrared (VNIR)";
const SWIR: &str = "Short Wave Infrared (SWIR)";

static SENTINEL2_L1C_BANDS: &[BandInfo] = &[
    band("b1", "Band 1", 60, 443.0, "Ultra Blue"),
    band("b2", "Band 2", 10, 490.0, "Blue"),
    band("b3", "Band 3", 10, 560.0, "Green"),
    band("b4", "Band 4", 10, 665.0, "Red"),
    band("b5", "Band 5", 20, 705.0, VNIR),
    band("b6", "Band 6", 20, 740.0, VNIR),
    band("b7", "Band 7", 20, 783.0, VNIR),
    band("b8", "Band 8", 10, 842.0, VNIR),
    band("b8a", "Band 8A", 20, 865.0, VNIR),
    band("b9", "Band 9", 60, 940.0, SWIR),
    band("b10", "Band 10", 60, 1375.0, SWIR),
    band("b11", "Band 11", 20, 1610.0, SWIR),
    band("b12", "Band 12", 20, 2190.0, SWIR),
];

// L2A drops the cirrus band (B10).
static SENTINEL2_L2A_BANDS: &[BandInfo] = &[
    band("b1", "Band 1", 60, 443.0, "Ultra Blue"),
    band("b2", "Band 2", 10, 490.0, "Blue"),
    band("b3", "Band 3", 10, 560.0, "Green"),
    band("b4", "Band 4", 10, 665.0, "Red"),
    band("b5", "Band 5", 20, 705.0, VNIR),
    band("b6", "Band 6", 20, 740.0, VNIR),
    band("b7", "Band 7", 20, 783.0, VNIR),
    band("b8", "Band 8", 10, 842.0, VNIR),
    band("b8a", "Band 8A", 20, 865.0, VNIR),
    band("b9", "Band 9", 60, 940.0, SWIR),
    band("b11", "Band 11", 20, 1610.0, SWIR),
    band("b12", "Band 12", 20, 2190.0, SWIR),
];

static LANDSAT8_TOA_BANDS: &[BandInfo] = &[
    band("b1", "Band 1", 30, 435.0, "Coastal/Aerosol"),
    band("b2", "Band 2", 30, 470.0, "Blue"),
    band("b3", "Band 3", 30, 560.0, "Green"),
    band("b4", "Band 4", 30, 655.0, "Red"),
    band("b5", "Band 5", 30, 865.0, "Near Infrared"),
    band("b6", "Band 6", 30, 1600.0, "Shortwave Infrared 1"),
    band("b7", "Band 7", 30, 2100.0, "Shortwave Infrared 2"),
    band("b8", "Band 8", 15, 500.0, "Panchromatic"),
    band("b9", "Band 9", 30, 1375.0, "Cirrus"),
    band("b10", "Band 10", 100, 4500.0, "Thermal Infrared 1"),
    band("b11", "Band 11", 100, 12000.0, "Thermal Infrared 2"),
];

static LANDSAT8_SR_BANDS: &[BandInfo] = &[
    band("b1", "Band 1", 30, 435.0, "Coastal/Aerosol"),
    band("b2", "Band 2", 30, 470.0, "Blue"),
    band("b3", "Band 3", 30, 560.0, "Green"),
    band("b4", "Band 4", 30, 655.0, "Red"),
    band("b5", "Band 5", 30, 865.0, "Near Infrared"),
    band("b6", "Band 6", 30, 1600.0, "Shortwave Infrared 1"),
    band("b7", "Band 7", 30, 2100.0, "Shortwave Infrared 2"),
];

static LANDSAT5_BANDS: &[BandInfo] = &[
    band("b1", "Band 1", 30, 485.0, "Blue"),
    band("b2", "Band 2", 30, 560.0, "Green"),
    band("b3", "Band 3", 30, 660.0, "Red"),
    band("b4", "Band 4", 30, 830.0, "Near Infrared"),
    band("b5", "Band 5", 30, 1650.0, "Shortwave Infrared 1"),
    band("b6", "Band 6", 120, 11450.0, "Thermal Infrared"),
    band("b7", "Band 7", 30, 2215.0, "Shortwave Infrared 2"),
];
