//! Terminal UI module with ratatui
//!
//! Trait-based rendering: the game loop hands a `ViewState` to a `UIRenderer`, which is the
//! ratatui `TerminalUI` in the binary and a mock in tests.

pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;

// Re-export public API
pub use renderer::UIRenderer;
pub use state::{Cell, StatusFields, StatusLine, ViewState};
pub use terminal::TerminalUI;
pub use theme::ColorTheme;

#[cfg(test)]
pub use renderer::tests::MockUIRenderer;
