//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the pool management form with ratatui and maps key
//! presses onto form edits and button presses.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
