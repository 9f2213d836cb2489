//! Loading of single raster bands from NumPy `.npy` files.
//!
//! A band file holds one 2D array in NumPy's `(height, width)` row-major
//! order. 3D arrays are accepted when one axis is a singleton, which is what
//! most band-splitting scripts produce. Samples are read as `u16`; `u8`,
//! `i16` and `i32` arrays are widened or clamped into the `u16` range.

use std::io::Cursor;
use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::ReadNpyExt;

use crate::error::RasterError;
use crate::scene::RasterBand;

/// NumPy magic bytes: \x93NUMPY
const MAGIC: &[u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

/// Returns true if `data` starts with the NumPy magic string.
pub fn is_npy(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// Decode a band from `.npy` bytes.
pub fn read_band(data: &[u8]) -> Result<RasterBand, RasterError> {
    let mut cursor = Cursor::new(data);

    let first_error = match ArrayD::<u16>::read_npy(&mut cursor) {
        Ok(array) => return array_to_band(array, |v| v),
        Err(e) => e,
    };

    cursor.set_position(0);
    if let Ok(array) = ArrayD::<u8>::read_npy(&mut cursor) {
        return array_to_band(array, u16::from);
    }

    cursor.set_position(0);
    if let Ok(array) = ArrayD::<i16>::read_npy(&mut cursor) {
        return array_to_band(array, |v| v.max(0) as u16);
    }

    cursor.set_position(0);
    if let Ok(array) = ArrayD::<i32>::read_npy(&mut cursor) {
        return array_to_band(array, |v| v.clamp(0, i32::from(u16::MAX)) as u16);
    }

    Err(RasterError::Npy(first_error))
}

/// Read and decode a band file from disk.
pub fn load_band_file(path: &Path) -> Result<RasterBand, RasterError> {
    let data = std::fs::read(path)?;
    log::debug!("load_band_file: {} ({} bytes)", path.display(), data.len());
    read_band(&data)
}

fn array_to_band<T: Copy>(
    array: ArrayD<T>,
    convert: impl Fn(T) -> u16,
) -> Result<RasterBand, RasterError> {
    let shape = array.shape().to_vec();
    let (height, width) = match shape.as_slice() {
        [h, w] => (*h, *w),
        [1, h, w] | [h, w, 1] => (*h, *w),
        _ => return Err(RasterError::UnsupportedShape { shape }),
    };

    // Logical iteration order is row-major regardless of the file's layout.
    let samples: Vec<u16> = array.iter().map(|&v| convert(v)).collect();
    log::debug!("read_band: {}x{} from shape {:?}", width, height, shape);

    RasterBand::new(width as u32, height as u32, samples)
}
