//! Customizable keybindings for rslabel.
//!
//! Bindings are persisted as `{name, display_name, keys}` records, where
//! `keys` is a single key or a two-key chord using browser-style key names
//! (`"w"`, `"Control"`, `"Meta"`, ...). [`KeyState`] tracks the keys held
//! down and resolves presses to [`Action`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tools::ToolKind;

/// Something a hotkey can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Activate the pen
    #[serde(rename = "hk_toggle_pen")]
    TogglePen,
    /// Toggle the map view
    #[serde(rename = "hk_toggle_map")]
    ToggleMap,
    /// Activate panning
    #[serde(rename = "hk_toggle_pan")]
    TogglePan,
    /// Activate the bucket
    #[serde(rename = "hk_toggle_bucket")]
    ToggleBucket,
    /// Cycle the Source Image normalization
    #[serde(rename = "hk_toggle_norm")]
    ToggleNormalization,
    /// Undo the last checkpoint
    #[serde(rename = "hk_undo")]
    Undo,
    /// Redo the last undone checkpoint
    #[serde(rename = "hk_redo")]
    Redo,
    /// Shrink the brush by one pixel
    #[serde(rename = "hk_decr_pen_size")]
    DecreasePenSize,
    /// Grow the brush by one pixel
    #[serde(rename = "hk_incr_pen_size")]
    IncreasePenSize,
    /// Activate the eraser
    #[serde(rename = "hk_toggle_eraser")]
    ToggleEraser,
    /// Activate the gap drawer
    #[serde(rename = "hk_toggle_gap_drawer")]
    ToggleGapDrawer,
    /// Open the magic wand
    #[serde(rename = "hk_toggle_wand")]
    ToggleWand,
}

impl Action {
    /// Get all actions in their default table order.
    pub fn all() -> &'static [Action] {
        &[
            Action::TogglePen,
            Action::ToggleMap,
            Action::TogglePan,
            Action::ToggleBucket,
            Action::ToggleNormalization,
            Action::Undo,
            Action::Redo,
            Action::DecreasePenSize,
            Action::IncreasePenSize,
            Action::ToggleEraser,
            Action::ToggleGapDrawer,
            Action::ToggleWand,
        ]
    }

    /// Persisted identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Action::TogglePen => "hk_toggle_pen",
            Action::ToggleMap => "hk_toggle_map",
            Action::TogglePan => "hk_toggle_pan",
            Action::ToggleBucket => "hk_toggle_bucket",
            Action::ToggleNormalization => "hk_toggle_norm",
            Action::Undo => "hk_undo",
            Action::Redo => "hk_redo",
            Action::DecreasePenSize => "hk_decr_pen_size",
            Action::IncreasePenSize => "hk_incr_pen_size",
            Action::ToggleEraser => "hk_toggle_eraser",
            Action::ToggleGapDrawer => "hk_toggle_gap_drawer",
            Action::ToggleWand => "hk_toggle_wand",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Action::TogglePen => "Plain Drawer",
            Action::ToggleMap => "Toggle Map",
            Action::TogglePan => "Panmove",
            Action::ToggleBucket => "Bucket",
            Action::ToggleNormalization => "Normalize",
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::DecreasePenSize => "Decrease Pen Size",
            Action::IncreasePenSize => "Increase Pen Size",
            Action::ToggleEraser => "Eraser",
            Action::ToggleGapDrawer => "Gap Drawer",
            Action::ToggleWand => "Wand",
        }
    }

    /// Default key.
    pub fn default_key(&self) -> &'static str {
        match self {
            Action::TogglePen => "w",
            Action::ToggleMap => "m",
            Action::TogglePan => "q",
            Action::ToggleBucket => "a",
            Action::ToggleNormalization => "x",
            Action::Undo => "z",
            Action::Redo => "y",
            Action::DecreasePenSize => "c",
            Action::IncreasePenSize => "v",
            Action::ToggleEraser => "e",
            Action::ToggleGapDrawer => "s",
            Action::ToggleWand => "d",
        }
    }

    /// Tool activated by this action, if it is a tool toggle.
    pub fn tool(&self) -> Option<ToolKind> {
        match self {
            Action::TogglePen => Some(ToolKind::PlainDraw),
            Action::ToggleMap => Some(ToolKind::MapView),
            Action::TogglePan => Some(ToolKind::Pan),
            Action::ToggleBucket => Some(ToolKind::Bucket),
            Action::ToggleEraser => Some(ToolKind::Eraser),
            Action::ToggleGapDrawer => Some(ToolKind::GapDrawer),
            Action::ToggleWand => Some(ToolKind::Wand),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One persisted binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Action identifier
    pub name: Action,
    /// Label shown in settings
    pub display_name: String,
    /// One key or a two-key chord
    pub keys: Vec<String>,
}

impl KeyBinding {
    /// Binding of `action` to `keys` with the default label.
    pub fn new(action: Action, keys: &[&str]) -> Self {
        Self {
            name: action,
            display_name: action.display_name().to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn is_chord_of(&self, a: &str, b: &str) -> bool {
        if self.keys.len() != 2 {
            return false;
        }
        let mut keys = [self.keys[0].as_str(), self.keys[1].as_str()];
        keys.sort_unstable();
        let mut pressed = [a, b];
        pressed.sort_unstable();
        keys == pressed
    }
}

/// Keybinding table for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: Action::all()
                .iter()
                .map(|&a| KeyBinding::new(a, &[a.default_key()]))
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted table. Actions missing from it keep their
    /// default key.
    pub fn from_bindings(bindings: Vec<KeyBinding>) -> Self {
        let mut table = Self::default();
        for binding in bindings {
            if binding.keys.is_empty() || binding.keys.len() > 2 {
                log::warn!(
                    "Ignoring binding for {} with {} keys",
                    binding.name.name(),
                    binding.keys.len()
                );
                continue;
            }
            table.set_keys(binding.name, binding.keys);
        }
        table
    }

    /// The full table.
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Keys bound to an action.
    pub fn keys_for(&self, action: Action) -> Option<&[String]> {
        self.bindings
            .iter()
            .find(|b| b.name == action)
            .map(|b| b.keys.as_slice())
    }

    /// Rebind an action.
    pub fn set_keys(&mut self, action: Action, keys: Vec<String>) {
        match self.bindings.iter_mut().find(|b| b.name == action) {
            Some(binding) => binding.keys = keys,
            None => self.bindings.push(KeyBinding {
                name: action,
                display_name: action.display_name().to_string(),
                keys,
            }),
        }
    }

    /// Action bound to a single key.
    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        self.bindings
            .iter()
            .find(|b| b.keys.len() == 1 && b.keys[0] == key)
            .map(|b| b.name)
    }

    /// Action bound to a two-key chord, in either order.
    pub fn action_for_chord(&self, a: &str, b: &str) -> Option<Action> {
        self.bindings
            .iter()
            .find(|binding| binding.is_chord_of(a, b))
            .map(|binding| binding.name)
    }

    /// Check if a key combination is already used by another binding.
    /// Returns the display name of what it's used for, if anything.
    pub fn key_conflict(&self, keys: &[String], exclude: Option<Action>) -> Option<String> {
        self.bindings
            .iter()
            .filter(|b| Some(b.name) != exclude)
            .find(|b| {
                let mut bound = b.keys.clone();
                bound.sort();
                let mut wanted = keys.to_vec();
                wanted.sort();
                bound == wanted
            })
            .map(|b| b.display_name.clone())
    }
}

/// Keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pressed: Vec<String>,
    chord_consumed: bool,
}

impl KeyState {
    /// Create an empty key state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key press and resolve it to an action.
    ///
    /// `Meta` clears every held key. A lone key matches single-key
    /// bindings; a chord fires once until a key is released.
    pub fn key_down(&mut self, key: &str, bindings: &KeyBindings) -> Option<Action> {
        if !self.pressed.iter().any(|k| k == key) {
            self.pressed.push(key.to_string());
        }
        if self.pressed.iter().any(|k| k == "Meta") {
            self.pressed.clear();
            return None;
        }

        match self.pressed.as_slice() {
            [single] => bindings.action_for_key(single),
            [a, b] if !self.chord_consumed => {
                self.chord_consumed = true;
                bindings.action_for_chord(a, b)
            }
            _ => None,
        }
    }

    /// Register a key release.
    pub fn key_up(&mut self, key: &str) {
        if key == "Meta" {
            self.pressed.clear();
        } else {
            self.pressed.retain(|k| k != key);
        }
        self.chord_consumed = false;
    }

    /// Keys currently held.
    pub fn pressed(&self) -> &[String] {
        &self.pressed
    }
}

/// Convert a key name to a display string.
pub fn key_to_display(key: &str) -> String {
    match key {
        "Control" => "Ctrl".to_string(),
        "Meta" => "⌘".to_string(),
        " " => "Space".to_string(),
        other => other.to_uppercase(),
    }
}

/// Display string for a binding's keys (`"Ctrl+Z"`).
pub fn keys_to_display(keys: &[String]) -> String {
    keys.iter()
        .map(|k| key_to_display(k))
        .collect::<Vec<_>>()
        .join("+")
}
