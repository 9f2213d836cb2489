//! Data models for rslabel.

mod class;

pub use class::{ClassTable, LabelClass, default_classes};
