//! Label export: painted layers to a class-id array in `.npy` format.
//!
//! One channel per exported layer, shape `[height, width, channels]`,
//! dtype `u8`. Each pixel holds the id of the class whose colour it was
//! painted with; transparent pixels and colours no class uses become 0.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ndarray::Array3;
use ndarray_npy::WriteNpyExt;

use crate::error::EditorError;
use crate::layers::LayerRegistry;
use crate::model::ClassTable;

/// Build the label array for `layers`, in the given channel order.
///
/// All layers must share the dimensions of the first one.
pub fn label_array(
    registry: &LayerRegistry,
    classes: &ClassTable,
    layers: &[&str],
) -> Result<Array3<u8>, EditorError> {
    let &first = layers.first().ok_or(EditorError::NoLayers)?;
    let (width, height) = registry
        .buffer(first)
        .ok_or_else(|| EditorError::unknown_layer(first))?
        .dimensions();

    let mut labels = Array3::<u8>::zeros((height as usize, width as usize, layers.len()));
    for (channel, &name) in layers.iter().enumerate() {
        let buffer = registry
            .buffer(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        let (found_width, found_height) = buffer.dimensions();
        if (found_width, found_height) != (width, height) {
            return Err(EditorError::DimensionMismatch {
                layer: name.to_string(),
                width,
                height,
                found_width,
                found_height,
            });
        }

        for (x, y, [r, g, b, a]) in buffer.enumerate() {
            if a != 0 {
                labels[[y as usize, x as usize, channel]] = classes.class_id_for_rgb([r, g, b]);
            }
        }
    }

    log::debug!(
        "label_array: {}x{} with {} channels",
        width,
        height,
        layers.len()
    );
    Ok(labels)
}

/// Serialize a label array as `.npy` bytes.
pub fn to_npy_bytes(labels: &Array3<u8>) -> Result<Vec<u8>, EditorError> {
    let mut bytes = Vec::new();
    labels.write_npy(&mut bytes)?;
    Ok(bytes)
}

/// Write a label array to a `.npy` file.
pub fn write_npy(path: &Path, labels: &Array3<u8>) -> Result<(), EditorError> {
    let writer = BufWriter::new(File::create(path)?);
    labels.write_npy(writer)?;
    log::info!("Wrote labels {:?} to {:?}", labels.shape(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::PixelBuffer;

    fn registry() -> LayerRegistry {
        let mut reg = LayerRegistry::new();
        let mut one = PixelBuffer::new(3, 2);
        one.put(0, 0, [0xFF, 0x00, 0x00, 255]);
        one.put(2, 1, [0x12, 0x34, 0x56, 255]);
        reg.add_layer("Drawing Layer 1", one, false);

        let mut two = PixelBuffer::new(3, 2);
        two.put(1, 0, [0x00, 0x00, 0xFF, 255]);
        two.put(1, 1, [0x00, 0x00, 0xFF, 0]);
        reg.add_layer("Drawing Layer 2", two, false);
        reg
    }

    #[test]
    fn test_label_array_shape_and_ids() {
        let reg = registry();
        let labels = label_array(
            &reg,
            &ClassTable::default(),
            &["Drawing Layer 1", "Drawing Layer 2"],
        )
        .unwrap();
        assert_eq!(labels.shape(), &[2, 3, 2]);
        assert_eq!(labels[[0, 0, 0]], 1, "building");
        assert_eq!(labels[[1, 2, 0]], 0, "unknown colour");
        assert_eq!(labels[[0, 1, 1]], 3, "water");
        assert_eq!(labels[[1, 1, 1]], 0, "transparent");
    }

    #[test]
    fn test_label_array_errors() {
        let mut reg = registry();
        let classes = ClassTable::default();
        assert!(matches!(
            label_array(&reg, &classes, &[]),
            Err(EditorError::NoLayers)
        ));
        assert!(matches!(
            label_array(&reg, &classes, &["Nope"]),
            Err(EditorError::UnknownLayer { .. })
        ));

        reg.add_layer("Legend", PixelBuffer::new(5, 5), false);
        assert!(matches!(
            label_array(&reg, &classes, &["Drawing Layer 1", "Legend"]),
            Err(EditorError::DimensionMismatch { found_width: 5, .. })
        ));
    }

    #[test]
    fn test_npy_header() {
        let reg = registry();
        let labels = label_array(&reg, &ClassTable::default(), &["Drawing Layer 1"]).unwrap();
        let bytes = to_npy_bytes(&labels).unwrap();
        assert_eq!(&bytes[..6], b"\x93NUMPY");
        let header = String::from_utf8_lossy(&bytes[10..]);
        assert!(header.contains("'descr': '|u1'"));
        assert!(header.contains("'shape': (2, 3, 1)"));
        assert!(bytes.ends_with(&[1, 0, 0, 0, 0, 0]));
    }
}
