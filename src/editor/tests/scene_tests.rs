//! Scene loading, rendered composites and worker-backed layer operations.

use std::io::Cursor;

use rslabel_raster::{IndexKind, NormType, RasterBand, RawScene, SatelliteType};

use super::{WAIT, editor, editor_with_source};
use crate::constants::SOURCE_IMAGE_LAYER;
use crate::error::EditorError;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::ToolKind;

fn band(samples: &[u16]) -> RasterBand {
    RasterBand::new(samples.len() as u32, 1, samples.to_vec()).unwrap()
}

/// 2x1 Sentinel-2 L2A scene with the true-colour bands and band 8.
fn sentinel_scene() -> RawScene {
    let mut scene = RawScene::new(SatelliteType::Sentinels2l2a, 2, 1);
    scene.insert_band("b4", band(&[50, 50])).unwrap();
    scene.insert_band("b3", band(&[10, 0])).unwrap();
    scene.insert_band("b2", band(&[5, 5])).unwrap();
    scene.insert_band("b8", band(&[100, 200])).unwrap();
    scene
}

/// 4x1 image of two dark and two light greys.
fn four_greys() -> PixelBuffer {
    let mut source = PixelBuffer::new(4, 1);
    source.put(0, 0, [0, 0, 0, 255]);
    source.put(1, 0, [10, 10, 10, 255]);
    source.put(2, 0, [240, 240, 240, 255]);
    source.put(3, 0, [250, 250, 250, 255]);
    source
}

#[test]
fn test_load_scene_renders_layers() {
    let mut editor = editor();
    editor
        .load_scene(sentinel_scene(), &[IndexKind::Ndvi])
        .unwrap();
    assert_eq!(editor.dimensions(), (2, 1));
    assert_eq!(editor.registry().len(), 3);
    assert_eq!(
        editor.registry().selected_drawing_layer(),
        Some("Drawing Layer 1")
    );
    assert!(editor.registry().settings("NDVI").unwrap().discretizable);

    assert_eq!(editor.finish_pending(WAIT), 2);
    assert_eq!(editor.pending_jobs(), 0);

    let ndvi = editor.registry().buffer("NDVI").unwrap();
    assert_eq!(ndvi.as_raw(), &[85, 85, 85, 255, 153, 153, 153, 255]);
    let source = editor.registry().buffer(SOURCE_IMAGE_LAYER).unwrap();
    assert_eq!(source.opaque_count(), 2);
}

#[test]
fn test_load_scene_missing_band_keeps_session() {
    let mut editor = editor_with_source(4, 4);
    let mut scene = RawScene::new(SatelliteType::Sentinels2l2a, 2, 1);
    scene.insert_band("b4", band(&[1, 2])).unwrap();

    let result = editor.load_scene(scene, &[]);
    assert!(matches!(result, Err(EditorError::Raster(_))));
    assert_eq!(editor.dimensions(), (4, 4));
    assert!(editor.registry().contains("Drawing Layer 1"));
}

#[test]
fn test_load_scene_rejects_unsupported_composite() {
    let mut editor = editor();
    let result = editor.load_scene(sentinel_scene(), &[IndexKind::Agriculture]);
    assert!(result.is_err());
    assert!(editor.registry().is_empty());
}

#[test]
fn test_toggle_normalization_rerenders_source() {
    let mut editor = editor();
    editor.load_scene(sentinel_scene(), &[]).unwrap();
    editor.finish_pending(WAIT);
    assert_eq!(editor.normalization(), NormType::Percentile1And99);

    let next = editor.toggle_normalization();
    assert_ne!(next, NormType::Percentile1And99);
    assert_eq!(editor.pending_jobs(), 1);
    assert_eq!(editor.finish_pending(WAIT), 1);
}

#[test]
fn test_discretize_reduces_colours() {
    let mut editor = editor();
    editor.load_source_image(four_greys());

    editor.toggle_kmeans_menu(SOURCE_IMAGE_LAYER).unwrap();
    editor.discretize(SOURCE_IMAGE_LAYER, Some(2)).unwrap();
    assert_eq!(editor.finish_pending(WAIT), 1);

    let buffer = editor.registry().buffer(SOURCE_IMAGE_LAYER).unwrap();
    assert_eq!(buffer.pixel(0, 0), buffer.pixel(1, 0));
    assert_eq!(buffer.pixel(2, 0), buffer.pixel(3, 0));
    assert_ne!(buffer.pixel(0, 0), buffer.pixel(3, 0));

    let settings = editor.registry().settings(SOURCE_IMAGE_LAYER).unwrap();
    assert!(settings.kmeans_clustered);
    assert!(!settings.kmeans_menu_open);
}

#[test]
fn test_result_for_removed_layer_is_dropped() {
    let mut editor = editor();
    editor.load_source_image(four_greys());
    editor.discretize(SOURCE_IMAGE_LAYER, Some(2)).unwrap();
    editor.remove_layer(SOURCE_IMAGE_LAYER).unwrap();

    assert_eq!(editor.finish_pending(WAIT), 0);
    assert!(!editor.registry().contains(SOURCE_IMAGE_LAYER));
}

#[test]
fn test_bucket_on_missing_layer_is_noop() {
    let mut editor = editor_with_source(4, 4);
    editor.remove_layer("Drawing Layer 1").unwrap();
    editor.activate_tool(ToolKind::Bucket);
    assert_eq!(editor.tool().draw_layer(), Some("Drawing Layer 1"));

    editor.pointer_down(1.0, 1.0);
    editor.pointer_up();
    assert_eq!(editor.pending_jobs(), 0);
}

#[test]
fn test_layer_settings() {
    let mut editor = editor_with_source(4, 4);
    editor.set_opacity("Drawing Layer 1", 250).unwrap();
    assert_eq!(
        editor.registry().settings("Drawing Layer 1").unwrap().opacity,
        100
    );
    assert!(editor.toggle_discrete_menu(SOURCE_IMAGE_LAYER).unwrap());
    assert!(
        editor
            .registry()
            .settings(SOURCE_IMAGE_LAYER)
            .unwrap()
            .discrete_active
    );
    assert!(matches!(
        editor.set_opacity("Nope", 10),
        Err(EditorError::UnknownLayer { .. })
    ));
}

#[test]
fn test_image_layer_scaled_to_scene() {
    let mut editor = editor_with_source(4, 4);
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    editor.add_image_layer("Legend", &bytes).unwrap();
    let legend = editor.registry().buffer("Legend").unwrap();
    assert_eq!(legend.dimensions(), (4, 4));
    assert_eq!(legend.pixel(3, 3), [0, 255, 0, 255]);

    assert!(matches!(
        editor.add_image_layer("Broken", b"not an image"),
        Err(EditorError::Image(_))
    ));
}

#[test]
fn test_export_labels_from_drawing() {
    let mut editor = editor_with_source(6, 6);
    editor.set_pen_size(2);
    editor.select_class(1);
    editor.activate_tool(ToolKind::PlainDraw);
    editor.pointer_down(1.0, 1.0);
    editor.pointer_up();

    let labels = editor.export(&["Drawing Layer 1"]).unwrap();
    assert_eq!(labels.shape(), &[6, 6, 1]);
    assert_eq!(labels[[0, 0, 0]], 2);
    assert_eq!(labels[[5, 5, 0]], 0);

    let flat = editor.flatten();
    assert_eq!(flat.pixel(0, 0), [0x44, 0xAA, 0x44, 255]);
    assert_eq!(flat.pixel(5, 5), [128, 128, 128, 255]);
}

#[test]
fn test_discretize_active_picks_composite_once() {
    let mut editor = editor();
    editor
        .load_scene(sentinel_scene(), &[IndexKind::Ndvi])
        .unwrap();
    editor.finish_pending(WAIT);

    assert_eq!(editor.discretize_active(Some(2)).as_deref(), Some("NDVI"));
    assert_eq!(editor.finish_pending(WAIT), 1);
    assert!(editor.registry().settings("NDVI").unwrap().kmeans_clustered);

    assert_eq!(editor.discretize_active(Some(2)), None);
}
