//! Scenario tests for the editing session.
//!
//! Each test drives an [`Editor`](super::Editor) through its public
//! operations the way a front-end would: pointer gestures, hotkeys and
//! scene loading, waiting on the workers where results are asynchronous.

use web_time::Duration;

use super::Editor;
use crate::config::AppConfig;
use crate::pixel_buffer::PixelBuffer;

mod drawing_tests;
mod scene_tests;

/// Generous upper bound for background jobs in tests.
const WAIT: Duration = Duration::from_secs(10);

/// An editor with default configuration.
fn editor() -> Editor {
    Editor::new(&AppConfig::default()).unwrap()
}

/// An editor on a uniform grey `width` x `height` source image.
fn editor_with_source(width: u32, height: u32) -> Editor {
    let mut editor = editor();
    let mut source = PixelBuffer::new(width, height);
    source.fill_rect(0, 0, width, height, [128, 128, 128, 255]);
    editor.load_source_image(source);
    editor
}
