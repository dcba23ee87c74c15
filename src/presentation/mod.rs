//! Presentation layer: ratatui rendering and keyboard input.

pub mod input;
pub mod ui;

pub use input::*;
pub use ui::*;
