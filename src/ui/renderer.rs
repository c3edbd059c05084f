//! UI renderer trait
//!
//! Rendering is kept behind a trait so the game loop can be driven headless in tests.

use crate::error::Result;
use crate::ui::ViewState;

/// Core trait for UI rendering
pub trait UIRenderer {
    /// Render the current view state to the terminal
    fn render(&mut self, view_state: &ViewState) -> Result<()>;

    /// Initialize the terminal UI
    ///
    /// This method should:
    /// - Set up raw mode
    /// - Enable mouse capture and focus reporting
    /// - Switch to the alternate screen
    fn initialize(&mut self) -> Result<()>;

    /// Clean up and restore terminal state
    fn cleanup(&mut self) -> Result<()>;

    /// Get current terminal dimensions
    fn get_terminal_size(&self) -> Result<(u16, u16)>; // (width, height)
}
