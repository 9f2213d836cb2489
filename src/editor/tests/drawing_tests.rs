//! Pointer gestures with the painting tools.

use super::{Editor, WAIT, editor_with_source};
use crate::config::AppConfig;
use crate::constants::MAX_PEN_SIZE;
use crate::history::HistoryAction;
use crate::keybindings::Action;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::{ActiveTool, ToolKind};

const RED: [u8; 4] = [0xFF, 0x00, 0x00, 255];
const BLUE: [u8; 4] = [0x00, 0x00, 0xFF, 255];

fn layer<'a>(editor: &'a super::Editor, name: &str) -> &'a PixelBuffer {
    editor.registry().buffer(name).unwrap()
}

#[test]
fn test_plain_draw_paints_pen_square() {
    let mut editor = editor_with_source(20, 20);
    editor.activate_tool(ToolKind::PlainDraw);
    editor.set_pen_size(2);

    editor.pointer_down(5.5, 5.5);
    editor.pointer_up();

    let buffer = layer(&editor, "Drawing Layer 1");
    assert_eq!(buffer.opaque_count(), 4);
    for (x, y) in [(4, 4), (5, 4), (4, 5), (5, 5)] {
        assert_eq!(buffer.pixel(x, y), RED);
    }
    assert_eq!(editor.history().history_len(), 2);
    assert_eq!(
        editor.history().last().unwrap().action,
        HistoryAction::DrawPixel
    );
}

#[test]
fn test_pointer_move_paints_only_while_down() {
    let mut editor = editor_with_source(20, 20);
    editor.activate_tool(ToolKind::PlainDraw);
    editor.set_pen_size(2);

    editor.pointer_move(5.0, 5.0);
    assert_eq!(layer(&editor, "Drawing Layer 1").opaque_count(), 0);

    editor.pointer_down(1.0, 1.0);
    editor.pointer_move(10.0, 10.0);
    editor.pointer_up();
    editor.pointer_move(15.0, 15.0);

    let buffer = layer(&editor, "Drawing Layer 1");
    assert_eq!(buffer.pixel(0, 0), RED);
    assert_eq!(buffer.pixel(9, 9), RED);
    assert_eq!(buffer.pixel(15, 15), [0, 0, 0, 0]);
}

#[test]
fn test_hidden_layer_is_not_painted() {
    let mut editor = editor_with_source(10, 10);
    assert!(!editor.toggle_visibility("Drawing Layer 1").unwrap());
    editor.activate_tool(ToolKind::PlainDraw);

    editor.pointer_down(5.0, 5.0);
    editor.pointer_up();

    assert_eq!(layer(&editor, "Drawing Layer 1").opaque_count(), 0);
}

#[test]
fn test_eraser_clears_square() {
    let mut editor = editor_with_source(10, 10);
    editor.set_pen_size(4);
    editor.activate_tool(ToolKind::PlainDraw);
    editor.pointer_down(4.0, 4.0);
    editor.pointer_up();
    assert_eq!(layer(&editor, "Drawing Layer 1").opaque_count(), 16);

    editor.set_pen_size(2);
    editor.activate_tool(ToolKind::Eraser);
    editor.pointer_down(4.0, 4.0);
    editor.pointer_up();

    let buffer = layer(&editor, "Drawing Layer 1");
    assert_eq!(buffer.opaque_count(), 12);
    assert_eq!(buffer.pixel(3, 3), [0, 0, 0, 0]);
    assert_eq!(
        editor.history().last().unwrap().action,
        HistoryAction::ErasePixel
    );
}

#[test]
fn test_gap_drawer_skips_painted_pixels() {
    let mut editor = editor_with_source(10, 10);
    editor.set_pen_size(4);

    let second = editor.add_drawing_layer();
    editor.select_class(2);
    editor.activate_tool(ToolKind::PlainDraw);
    editor.pointer_down(2.0, 2.0);
    editor.pointer_up();
    assert_eq!(layer(&editor, &second).pixel(1, 1), BLUE);

    assert!(editor.select_layer("Drawing Layer 1", true));
    editor.select_class(0);
    editor.set_pen_size(8);
    editor.activate_tool(ToolKind::GapDrawer);
    editor.pointer_down(4.0, 4.0);
    editor.pointer_up();

    let first = layer(&editor, "Drawing Layer 1");
    assert_eq!(first.pixel(1, 1), [0, 0, 0, 0]);
    assert_eq!(first.pixel(6, 6), RED);
    assert_eq!(first.opaque_count(), 64 - 16);
    assert_eq!(
        editor.history().last().unwrap().action,
        HistoryAction::AbDraw
    );
}

#[test]
fn test_wand_picks_then_recolours_locally() {
    let mut editor = editor_with_source(20, 20);
    editor.set_pen_size(4);
    editor.activate_tool(ToolKind::PlainDraw);
    editor.pointer_down(2.0, 2.0);
    editor.pointer_up();
    editor.pointer_down(12.0, 12.0);
    editor.pointer_up();

    editor.activate_tool(ToolKind::Wand);
    assert!(editor.tool().wand_menu_open());

    editor.pointer_down(1.0, 1.0);
    editor.pointer_up();
    assert_eq!(
        editor.tool(),
        &ActiveTool::Wand {
            draw_layer: "Drawing Layer 1".to_string(),
            overwrite: "#FF0000".to_string(),
        }
    );
    assert_eq!(layer(&editor, "Drawing Layer 1").pixel(1, 1), RED);

    editor.select_class(2);
    editor.pointer_down(2.0, 2.0);
    editor.pointer_up();

    let buffer = layer(&editor, "Drawing Layer 1");
    assert_eq!(buffer.pixel(1, 1), BLUE);
    assert_eq!(buffer.pixel(11, 11), RED, "outside the brush square");
    assert_eq!(buffer.pixel(6, 6), [0, 0, 0, 0]);
}

#[test]
fn test_magnetic_drawer_paints_near_anchor() {
    let mut editor = super::editor();
    let mut source = PixelBuffer::new(20, 10);
    source.fill_rect(10, 0, 10, 10, [255, 255, 255, 255]);
    source.fill_rect(0, 0, 10, 10, [0, 0, 0, 255]);
    editor.load_source_image(source);
    editor.set_pen_size(2);
    editor.activate_tool(ToolKind::MagneticDrawer);

    editor.pointer_down(8.0, 5.0);
    editor.pointer_up();

    let buffer = layer(&editor, "Drawing Layer 1");
    assert_eq!(buffer.opaque_count(), 4);
    let near_anchor = [(6, 5), (8, 5), (7, 4), (7, 6)]
        .iter()
        .any(|&(x, y)| buffer.pixel(x, y) == RED);
    assert!(near_anchor);
    assert_eq!(
        editor.history().last().unwrap().action,
        HistoryAction::TabDraw
    );
}

#[test]
fn test_tool_activation_is_exclusive() {
    let mut editor = editor_with_source(10, 10);
    editor.activate_tool(ToolKind::Bucket);
    assert_eq!(editor.tool().draw_layer(), Some("Drawing Layer 1"));

    editor.activate_tool(ToolKind::PlainDraw);
    assert!(editor.tool().is(ToolKind::PlainDraw));
    assert_eq!(editor.tool().draw_layer(), None);

    editor.activate_tool(ToolKind::MapView);
    editor.activate_tool(ToolKind::MapView);
    assert!(editor.tool().is(ToolKind::Pan));
}

#[test]
fn test_selecting_other_layer_closes_tools() {
    let mut editor = editor_with_source(10, 10);
    editor.activate_tool(ToolKind::Eraser);
    assert!(editor.select_layer("Source Image", true));
    assert!(editor.tool().is(ToolKind::Pan));
    assert!(!editor.select_layer("Nope", true));
}

#[test]
fn test_removed_target_resets_tool() {
    let mut editor = editor_with_source(10, 10);
    let second = editor.add_drawing_layer();
    editor.activate_tool(ToolKind::GapDrawer);
    assert_eq!(editor.tool().draw_layer(), Some(second.as_str()));

    editor.remove_layer(&second).unwrap();
    assert!(editor.tool().is(ToolKind::Pan));
    assert!(editor.remove_layer(&second).is_err());
}

#[test]
fn test_hotkeys_switch_tools_and_pen_size() {
    let mut editor = editor_with_source(10, 10);
    editor.set_pen_size(1);

    assert_eq!(editor.key_down("w"), Some(Action::TogglePen));
    editor.key_up("w");
    assert!(editor.tool().is(ToolKind::PlainDraw));

    editor.key_down("c");
    editor.key_up("c");
    assert_eq!(editor.pen_size(), 1, "pen size never drops below 1");

    editor.key_down("v");
    editor.key_up("v");
    assert_eq!(editor.pen_size(), 2);
}

#[test]
fn test_pen_size_is_capped() {
    let mut config = AppConfig::default();
    config.preferences.pen_size = u32::MAX;
    let mut editor = Editor::new(&config).unwrap();
    assert_eq!(editor.pen_size(), MAX_PEN_SIZE);

    editor.increase_pen_size();
    assert_eq!(editor.pen_size(), MAX_PEN_SIZE);
    editor.set_pen_size(u32::MAX);
    assert_eq!(editor.pen_size(), MAX_PEN_SIZE);

    let mut source = PixelBuffer::new(4, 4);
    source.fill_rect(0, 0, 4, 4, [128, 128, 128, 255]);
    editor.load_source_image(source);
    editor.activate_tool(ToolKind::MagneticDrawer);
    editor.pointer_down(1.0, 1.0);
    editor.pointer_up();
    assert_eq!(layer(&editor, "Drawing Layer 1").opaque_count(), 16);
}

#[test]
fn test_hotkeys_ignored_while_wand_menu_open() {
    let mut editor = editor_with_source(10, 10);
    editor.activate_tool(ToolKind::Wand);

    assert_eq!(editor.key_down("w"), None);
    editor.key_up("w");
    assert!(editor.tool().wand_menu_open());

    let pen = editor.pen_size();
    assert!(!editor.perform_action(Action::IncreasePenSize));
    assert_eq!(editor.pen_size(), pen);
}

#[test]
fn test_bucket_fill_paints_region_and_checkpoints() {
    let mut editor = super::editor();
    let mut source = PixelBuffer::new(10, 4);
    source.fill_rect(0, 0, 5, 4, [10, 10, 10, 255]);
    source.fill_rect(5, 0, 5, 4, [200, 200, 200, 255]);
    editor.load_source_image(source);
    editor.set_tolerance(30.0);
    editor.activate_tool(ToolKind::Bucket);

    editor.pointer_down(1.5, 1.5);
    editor.pointer_up();
    assert_eq!(editor.finish_pending(WAIT), 1);

    let buffer = layer(&editor, "Drawing Layer 1");
    assert_eq!(buffer.opaque_count(), 20);
    assert_eq!(buffer.pixel(4, 3), RED);
    assert_eq!(buffer.pixel(5, 0), [0, 0, 0, 0]);
    assert_eq!(
        editor.history().last().unwrap().action,
        HistoryAction::BucketFill
    );

    assert_eq!(editor.undo().as_deref(), Some("Drawing Layer 1"));
    assert_eq!(layer(&editor, "Drawing Layer 1").opaque_count(), 0);
}
