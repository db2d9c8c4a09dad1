//! Blockfall — classic falling-block puzzle game in the terminal.
//!
//! [`game`] holds the rules and is independent of the terminal; [`app`] runs the event loop and
//! [`ui`] draws a [`game::Snapshot`] with ratatui.

pub mod app;
pub mod game;
pub mod input;
pub mod theme;
pub mod ui;

pub use app::{App, GameConfig};
