//! Label classes and the colour to class-id table used by export.

use serde::{Deserialize, Serialize};

use crate::color;

/// A label class with a name and paint colour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelClass {
    /// Class id written into exported label arrays (0 is reserved for "none")
    pub id: u8,
    /// Display name of the class
    pub name: String,
    /// RGB paint colour
    pub color: [u8; 3],
}

impl LabelClass {
    /// Create a new class with the given id, name, and colour.
    pub fn new(id: u8, name: &str, color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
        }
    }

    /// Paint colour as `#RRGGBB`.
    pub fn hex(&self) -> String {
        color::to_hex(self.color)
    }
}

/// Built-in classes.
pub fn default_classes() -> Vec<LabelClass> {
    vec![
        LabelClass::new(1, "Building", [0xFF, 0x00, 0x00]),
        LabelClass::new(2, "Vegetation", [0x44, 0xAA, 0x44]),
        LabelClass::new(3, "Water", [0x00, 0x00, 0xFF]),
        LabelClass::new(4, "Bare Ground", [0xFF, 0xE0, 0x00]),
    ]
}

/// Ordered set of label classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTable {
    classes: Vec<LabelClass>,
}

impl ClassTable {
    /// Build a table from classes in display order.
    pub fn new(classes: Vec<LabelClass>) -> Self {
        Self { classes }
    }

    /// Class at a display index.
    pub fn get(&self, index: usize) -> Option<&LabelClass> {
        self.classes.get(index)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True if the table holds no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate in display order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelClass> {
        self.classes.iter()
    }

    /// Class id for a painted colour; 0 for colours no class uses.
    pub fn class_id_for_hex(&self, hex: &str) -> u8 {
        self.classes
            .iter()
            .find(|class| color::hex_eq(&class.hex(), hex))
            .map_or(0, |class| class.id)
    }

    /// Class id for an RGB triple; 0 for colours no class uses.
    pub fn class_id_for_rgb(&self, rgb: [u8; 3]) -> u8 {
        self.classes
            .iter()
            .find(|class| class.color == rgb)
            .map_or(0, |class| class.id)
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new(default_classes())
    }
}
