//! Terminal UI implementation using ratatui
//!
//! Draws the menu bar, the maze, the status line, and the about dialog. Input is collected
//! separately by the input thread; this type only renders.

use crate::error::{Result, TiltMazeError};
use crate::input::MenuCommand;
use crate::ui::{Cell, ColorTheme, UIRenderer, ViewState};
use ratatui::crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

const ABOUT_TEXT: &str = "Tilt Mazes\n\nRoll the ball over every goal to clear the maze.\n\
Swipe with the mouse or use the arrow keys.\n\nPress any key to close.";

const TOO_SMALL_TEXT: &str = "Enlarge the terminal to see the maze";

/// Terminal UI implementation with ratatui backend
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

impl TerminalUI {
    pub fn new() -> Result<Self> {
        Self::with_theme(ColorTheme::default())
    }

    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
        })
    }

    fn render_menu(frame: &mut Frame, area: Rect, theme: &ColorTheme) {
        let mut spans = Vec::new();
        for command in MenuCommand::ALL {
            spans.push(Span::styled(format!("[{}]", command.hotkey()), theme.menu_key));
            spans.push(Span::raw(format!(" {}  ", command.label())));
        }
        spans.push(Span::styled("[q]", theme.menu_key));
        spans.push(Span::raw(" Quit"));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn maze_lines<'a>(view_state: &ViewState, theme: &ColorTheme) -> Vec<Line<'a>> {
        let floor = match theme.floor {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        };
        view_state
            .cells
            .iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|cell| match cell {
                        Cell::Wall => Span::styled("  ", theme.wall),
                        Cell::Floor => Span::styled("  ", floor),
                        Cell::Goal => Span::styled("<>", theme.goal),
                        Cell::Ball => Span::styled("()", theme.ball),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn render_status(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let status_style = Style::default().bg(theme.status_bg).fg(theme.status_fg);
        let status = Paragraph::new(view_state.format_status_line()).style(status_style);
        frame.render_widget(status, area);
    }

    fn render_about(frame: &mut Frame, area: Rect, theme: &ColorTheme) {
        let popup = centered_rect(52, 9, area);
        let block = Block::default()
            .title("About")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.dialog_border));
        let body = Paragraph::new(ABOUT_TEXT)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(Clear, popup);
        frame.render_widget(body, popup);
    }
}

/// A `width` x `height` rectangle centred in `area`, clipped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, view_state: &ViewState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;

            terminal.draw(move |frame| {
                let size = frame.size();

                let chunks = Layout::default()
                    .direction(LayoutDirection::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(0),
                        Constraint::Length(1),
                    ])
                    .split(size);

                Self::render_menu(frame, chunks[0], theme);

                if view_state.maze_fits() {
                    let maze_height = view_state.cells.len() as u16;
                    let maze_area = centered_rect(chunks[1].width, maze_height, chunks[1]);
                    let maze = Paragraph::new(Self::maze_lines(view_state, theme))
                        .alignment(Alignment::Center);
                    frame.render_widget(maze, maze_area);
                } else {
                    let notice_area = centered_rect(chunks[1].width, 1, chunks[1]);
                    let notice = Paragraph::new(TOO_SMALL_TEXT).alignment(Alignment::Center);
                    frame.render_widget(notice, notice_area);
                }

                Self::render_status(frame, chunks[2], view_state, theme);

                if view_state.show_about {
                    Self::render_about(frame, size, theme);
                }
            })?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            disable_raw_mode()?;
            execute!(
                io::stdout(),
                DisableFocusChange,
                DisableMouseCapture,
                LeaveAlternateScreen
            )?;
            self.terminal = None;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        if cols == 0 || rows == 0 {
            return Err(TiltMazeError::ui("terminal reports a zero-sized window"));
        }
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_terminal_ui_creation() {
        let ui = TerminalUI::new().unwrap();
        assert!(ui.terminal.is_none());
        assert_eq!(ui.theme.status_bg, Color::Blue);

        let mono = TerminalUI::with_theme(ColorTheme::monochrome()).unwrap();
        assert_eq!(mono.theme.status_bg, Color::Black);
    }

    #[test]
    fn test_centered_rect_clips_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(80, 40, area), area);
    }

    #[test]
    fn test_maze_lines_are_two_columns_per_cell() {
        let mut view_state = ViewState::new(80, 24);
        view_state.cells = vec![vec![Cell::Wall, Cell::Ball, Cell::Goal, Cell::Floor]];
        let lines = TerminalUI::maze_lines(&view_state, &ColorTheme::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width(), 8);
    }
}
