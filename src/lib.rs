//! labelgrid - keyboard-driven image labeling
//!
//! The state and navigation engine of an image-annotation grid: items come
//! from a flat metadata CSV, each gets at most one label from a configurable
//! label set plus an optional comment, and every change is written back to
//! the same CSV.
//!
//! The engine is headless. A host feeds it key events through
//! [`app::Session::handle_key`] and renders whatever the session exposes.

pub mod annotation;
pub mod app;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod format;
pub mod input;
pub mod keybindings;
pub mod labels;
pub mod message;
pub mod model;
pub mod navigation;
pub mod state;
pub mod undo;

pub use app::{LoadError, Session};
pub use config::AppConfig;
