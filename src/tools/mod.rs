//! Tool state and the pixel-mutation algorithms behind each tool.
//!
//! Exactly one tool is active at a time. [`ActiveTool`] is a closed enum, so
//! activating a tool replaces whatever was active before; tools that paint
//! into a fixed layer capture it at activation (or, for the wand, when the
//! overwrite colour is picked).

pub mod brush;
pub mod flood_fill;
pub mod magnetic;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use flood_fill::{FillRequest, flood_fill, fill_mask};

/// Tool identifiers as exposed to toolbars and hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Move the view
    Pan,
    /// Square pen
    PlainDraw,
    /// Square eraser
    Eraser,
    /// Flood fill with tolerance
    Bucket,
    /// Colour overwrite within the brush footprint
    Wand,
    /// Pen that only paints pixels no drawing layer has painted
    GapDrawer,
    /// Pen that snaps to strong edges of the Source Image
    MagneticDrawer,
    /// Map overlay (toggles)
    MapView,
}

impl ToolKind {
    /// Get all tool identifiers.
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Pan,
            ToolKind::PlainDraw,
            ToolKind::Eraser,
            ToolKind::Bucket,
            ToolKind::Wand,
            ToolKind::GapDrawer,
            ToolKind::MagneticDrawer,
            ToolKind::MapView,
        ]
    }

    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pan => "Pan",
            ToolKind::PlainDraw => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Bucket => "Bucket Fill",
            ToolKind::Wand => "Magic Wand",
            ToolKind::GapDrawer => "Gap Drawer",
            ToolKind::MagneticDrawer => "Magnetic Drawer",
            ToolKind::MapView => "Map",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cursor affordance shown for the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Default arrow
    Default,
    /// Hand / move
    Move,
    /// Pen
    Draw,
    /// Eraser
    Delete,
    /// Paint bucket
    Bucket,
    /// Wand
    Wand,
    /// Gap stick
    Gap,
}

/// The single active tool and its sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveTool {
    /// Panning; no pointer mutations
    #[default]
    Pan,
    /// Paints into the selected drawing layer
    PlainDraw,
    /// Erases from the selected drawing layer
    Eraser,
    /// Flood fills into `draw_layer`
    Bucket {
        /// Target layer captured at activation
        draw_layer: String,
    },
    /// Wand waiting for the overwrite colour to be picked
    WandMenu,
    /// Wand recolouring `overwrite` pixels of `draw_layer`
    Wand {
        /// Layer sampled and painted
        draw_layer: String,
        /// Picked `#RRGGBB` colour to replace
        overwrite: String,
    },
    /// Gap filling into `draw_layer`
    GapDrawer {
        /// Target layer captured at activation
        draw_layer: String,
    },
    /// Edge-snapping pen painting into `draw_layer`
    MagneticDrawer {
        /// Target layer captured at activation
        draw_layer: String,
    },
    /// Map overlay open; nothing else active
    MapView,
}

impl ActiveTool {
    /// Tool state after activating `kind`.
    ///
    /// `selected_drawing` is the currently selected drawing layer, captured by
    /// tools that paint into a fixed layer. Activating the map while it is
    /// open closes it and returns to panning.
    pub fn activate(&self, kind: ToolKind, selected_drawing: &str) -> ActiveTool {
        let draw_layer = selected_drawing.to_string();
        match kind {
            ToolKind::Pan => ActiveTool::Pan,
            ToolKind::PlainDraw => ActiveTool::PlainDraw,
            ToolKind::Eraser => ActiveTool::Eraser,
            ToolKind::Bucket => ActiveTool::Bucket { draw_layer },
            ToolKind::Wand => ActiveTool::WandMenu,
            ToolKind::GapDrawer => ActiveTool::GapDrawer { draw_layer },
            ToolKind::MagneticDrawer => ActiveTool::MagneticDrawer { draw_layer },
            ToolKind::MapView => {
                if matches!(self, ActiveTool::MapView) {
                    ActiveTool::Pan
                } else {
                    ActiveTool::MapView
                }
            }
        }
    }

    /// Identifier of the active tool.
    pub fn kind(&self) -> ToolKind {
        match self {
            ActiveTool::Pan => ToolKind::Pan,
            ActiveTool::PlainDraw => ToolKind::PlainDraw,
            ActiveTool::Eraser => ToolKind::Eraser,
            ActiveTool::Bucket { .. } => ToolKind::Bucket,
            ActiveTool::WandMenu | ActiveTool::Wand { .. } => ToolKind::Wand,
            ActiveTool::GapDrawer { .. } => ToolKind::GapDrawer,
            ActiveTool::MagneticDrawer { .. } => ToolKind::MagneticDrawer,
            ActiveTool::MapView => ToolKind::MapView,
        }
    }

    /// True if `kind` is the active tool.
    pub fn is(&self, kind: ToolKind) -> bool {
        self.kind() == kind
    }

    /// Layer captured by the tool, if it paints into a fixed layer.
    pub fn draw_layer(&self) -> Option<&str> {
        match self {
            ActiveTool::Bucket { draw_layer }
            | ActiveTool::Wand { draw_layer, .. }
            | ActiveTool::GapDrawer { draw_layer }
            | ActiveTool::MagneticDrawer { draw_layer } => Some(draw_layer),
            _ => None,
        }
    }

    /// True if a completed pointer gesture with this tool records a checkpoint.
    ///
    /// Bucket fills checkpoint when the fill result is applied instead.
    pub fn checkpoints_on_release(&self) -> bool {
        matches!(
            self,
            ActiveTool::PlainDraw
                | ActiveTool::Eraser
                | ActiveTool::Wand { .. }
                | ActiveTool::GapDrawer { .. }
                | ActiveTool::MagneticDrawer { .. }
        )
    }

    /// True while the wand is waiting for a colour pick.
    pub fn wand_menu_open(&self) -> bool {
        matches!(self, ActiveTool::WandMenu)
    }

    /// Cursor affordance for this tool.
    pub fn cursor(&self) -> Cursor {
        match self {
            ActiveTool::Pan => Cursor::Move,
            ActiveTool::PlainDraw | ActiveTool::MagneticDrawer { .. } => Cursor::Draw,
            ActiveTool::Eraser => Cursor::Delete,
            ActiveTool::Bucket { .. } => Cursor::Bucket,
            ActiveTool::WandMenu | ActiveTool::Wand { .. } => Cursor::Wand,
            ActiveTool::GapDrawer { .. } => Cursor::Gap,
            ActiveTool::MapView => Cursor::Default,
        }
    }
}
