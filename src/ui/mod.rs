//! Terminal host using ratatui.
//!
//! Provides the window, canvas and keyboard input the overlay runs on.

pub mod input;
pub mod terminal;

pub use input::TerminalInput;
pub use terminal::TerminalHost;
