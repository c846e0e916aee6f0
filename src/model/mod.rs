//! Data models for the annotation engine.

mod item;
mod label;

pub use item::Item;
pub use label::{LabelDefinition, Mark};
