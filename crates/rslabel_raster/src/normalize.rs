//! Contrast normalization of raw 16-bit bands into displayable 8-bit RGBA.
//!
//! Every channel is stretched independently. Percentile stretches sort a copy
//! of the channel and take the samples at `floor(n * p)` and
//! `floor(n * (1 - p))` as the low and high bounds; values are then mapped
//! linearly onto `[0, 255]`, floored and clamped. A channel whose bounds
//! coincide maps to 0 everywhere.

use serde::{Deserialize, Serialize};

use crate::error::RasterError;

/// Normalization strategy for raw bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NormType {
    /// Stretch between the 1st and 99th percentile
    #[default]
    #[serde(rename = "1and99percentile")]
    Percentile1And99,
    /// Stretch between the 5th and 95th percentile
    #[serde(rename = "5and95percentile")]
    Percentile5And95,
    /// Stretch between the channel minimum and maximum
    #[serde(rename = "minmax")]
    MinMax,
    /// Histogram equalization
    #[serde(rename = "histogram")]
    Histogram,
}

impl NormType {
    /// Get the display name for this normalization.
    pub fn name(&self) -> &'static str {
        match self {
            NormType::Percentile1And99 => "1% and 99% Percentile",
            NormType::Percentile5And95 => "5% and 95% Percentile",
            NormType::MinMax => "Min-Max",
            NormType::Histogram => "Histogram Equalization",
        }
    }

    /// Get all normalizations in cycling order.
    pub fn all() -> &'static [NormType] {
        &[
            NormType::Percentile1And99,
            NormType::Percentile5And95,
            NormType::MinMax,
            NormType::Histogram,
        ]
    }

    /// The normalization that follows this one when cycling.
    pub fn next(&self) -> NormType {
        let all = Self::all();
        let index = all.iter().position(|n| n == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }

    /// Lower percentile as a fraction, for the percentile strategies.
    fn percentile(&self) -> Option<f64> {
        match self {
            NormType::Percentile1And99 => Some(0.01),
            NormType::Percentile5And95 => Some(0.05),
            NormType::MinMax | NormType::Histogram => None,
        }
    }
}

/// An 8-bit RGBA raster, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgba8Raster {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel bytes (`width * height * 4`)
    pub data: Vec<u8>,
}

impl Rgba8Raster {
    /// Build an opaque raster from up to three channel planes.
    ///
    /// Missing channels are zero; a single plane is replicated into grey.
    pub fn from_planes(planes: &[Vec<u8>], width: u32, height: u32) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for i in 0..pixel_count {
            let (r, g, b) = match planes {
                [grey] => (grey[i], grey[i], grey[i]),
                [r, g] => (r[i], g[i], 0),
                [r, g, b, ..] => (r[i], g[i], b[i]),
                [] => (0, 0, 0),
            };
            data.extend_from_slice(&[r, g, b, 255]);
        }

        Self {
            width,
            height,
            data,
        }
    }
}

/// Normalize 1 to 3 raw bands into an RGBA raster with alpha 255.
///
/// Each band must hold exactly `width * height` samples. With one band the
/// result is greyscale.
pub fn normalize(
    bands: &[&[u16]],
    width: u32,
    height: u32,
    norm: NormType,
) -> Result<Rgba8Raster, RasterError> {
    if bands.is_empty() || bands.len() > 3 {
        return Err(RasterError::BandCount {
            expected: "1 to 3",
            found: bands.len(),
        });
    }
    check_dimensions(bands, width, height)?;

    log::debug!(
        "normalize: {} bands, {}x{}, {}",
        bands.len(),
        width,
        height,
        norm.name()
    );

    let planes: Vec<Vec<u8>> = bands.iter().map(|band| stretch_channel(band, norm)).collect();
    Ok(Rgba8Raster::from_planes(&planes, width, height))
}

/// Stretch a single channel to 8 bits.
pub fn stretch_channel(channel: &[u16], norm: NormType) -> Vec<u8> {
    if channel.is_empty() {
        return Vec::new();
    }

    match norm {
        NormType::Histogram => equalize_channel(channel),
        NormType::MinMax => {
            let low = channel.iter().copied().min().unwrap_or(0);
            let high = channel.iter().copied().max().unwrap_or(0);
            linear_stretch(channel, low, high)
        }
        NormType::Percentile1And99 | NormType::Percentile5And95 => {
            let p = norm.percentile().unwrap_or(0.01);
            let (low, high) = percentile_bounds(channel, p);
            linear_stretch(channel, low, high)
        }
    }
}

/// Low and high bounds at the `p` and `1 - p` fractional indices of the
/// sorted channel.
pub fn percentile_bounds(channel: &[u16], p: f64) -> (u16, u16) {
    let mut sorted = channel.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    let last = n.saturating_sub(1);
    let low_index = ((n as f64 * p).floor() as usize).min(last);
    let high_index = ((n as f64 * (1.0 - p)).floor() as usize).min(last);

    (sorted[low_index], sorted[high_index])
}

fn linear_stretch(channel: &[u16], low: u16, high: u16) -> Vec<u8> {
    if high <= low {
        log::trace!("linear_stretch: degenerate bounds {}..{}, mapping to 0", low, high);
        return vec![0; channel.len()];
    }

    let range = f64::from(high) - f64::from(low);
    channel
        .iter()
        .map(|&v| {
            let scaled = ((f64::from(v) - f64::from(low)) / range * 255.0).floor();
            scaled.clamp(0.0, 255.0) as u8
        })
        .collect()
}

fn equalize_channel(channel: &[u16]) -> Vec<u8> {
    let mut histogram = vec![0u32; u16::MAX as usize + 1];
    for &v in channel {
        histogram[v as usize] += 1;
    }

    let mut cdf = vec![0u64; histogram.len()];
    let mut running = 0u64;
    for (slot, &count) in cdf.iter_mut().zip(histogram.iter()) {
        running += u64::from(count);
        *slot = running;
    }

    let total = channel.len() as u64;
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total == cdf_min {
        return vec![0; channel.len()];
    }

    let denominator = (total - cdf_min) as f64;
    channel
        .iter()
        .map(|&v| {
            let numerator = (cdf[v as usize] - cdf_min) as f64;
            (numerator / denominator * 255.0).round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

pub(crate) fn check_dimensions(
    bands: &[&[u16]],
    width: u32,
    height: u32,
) -> Result<(), RasterError> {
    let expected = width as usize * height as usize;
    for band in bands {
        if band.len() != expected {
            return Err(RasterError::dimension_mismatch(band.len(), width, height));
        }
    }
    Ok(())
}
