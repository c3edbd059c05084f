//! Color theme and styling definitions using ratatui colors

use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone)]
pub struct ColorTheme {
    /// Maze walls
    pub wall: Style,

    /// Open floor (None uses terminal default)
    pub floor: Option<Color>,

    /// The ball
    pub ball: Style,

    /// Uncollected goals
    pub goal: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,

    /// Hotkey letters in the menu bar
    pub menu_key: Style,

    /// About dialog frame
    pub dialog_border: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            wall: Style::default().fg(Color::Gray).bg(Color::DarkGray),
            floor: None,
            ball: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
            goal: Style::default().fg(Color::Yellow),
            status_bg: Color::Blue,
            status_fg: Color::White,
            menu_key: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            dialog_border: Color::Cyan,
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            wall: Style::default().add_modifier(Modifier::REVERSED),
            floor: None,
            ball: Style::default().add_modifier(Modifier::BOLD),
            goal: Style::default(),
            status_bg: Color::Black,
            status_fg: Color::White,
            menu_key: Style::default().add_modifier(Modifier::UNDERLINED),
            dialog_border: Color::White,
        }
    }
}
