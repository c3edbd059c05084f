//! UI state management structures
//!
//! `ViewState` is a render-ready copy of what the player sees: the maze grid, the labels for
//! maze name and remaining goals, the status line, and whether the about dialog is open.

use crate::engine::{Direction, MazeEngine};

/// What occupies a maze cell on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Floor,
    Goal,
    Ball,
}

/// Render state for one frame
#[derive(Debug)]
pub struct ViewState {
    /// Maze grid, row-major
    pub cells: Vec<Vec<Cell>>,

    /// Label for the current maze
    pub maze_name: String,

    /// Position of the maze in the map sequence (1-based) and sequence length
    pub maze_number: (usize, usize),

    /// Label for goals still on the board
    pub remaining_goals: usize,

    /// Moves made on the current maze
    pub moves: u32,

    /// Last roll the player issued
    pub last_direction: Direction,

    /// True while the game is backgrounded (ticks frozen)
    pub paused: bool,

    /// About dialog visibility
    pub show_about: bool,

    /// Status line content
    pub status_line: StatusLine,

    /// Viewport dimensions
    pub viewport_width: u16,
    pub viewport_height: u16,
}

impl ViewState {
    pub fn new(viewport_width: u16, viewport_height: u16) -> Self {
        Self {
            cells: Vec::new(),
            maze_name: String::new(),
            maze_number: (0, 0),
            remaining_goals: 0,
            moves: 0,
            last_direction: Direction::None,
            paused: false,
            show_about: false,
            status_line: StatusLine::new(),
            viewport_width,
            viewport_height,
        }
    }

    /// Copy the visible parts of the engine into this frame.
    pub fn sync_from(&mut self, engine: &MazeEngine) {
        let map = engine.map();
        let mut cells: Vec<Vec<Cell>> = Vec::with_capacity(map.height() as usize);
        for y in 0..map.height() {
            let row = (0..map.width())
                .map(|x| {
                    if map.is_wall(x as i32, y as i32) {
                        Cell::Wall
                    } else {
                        Cell::Floor
                    }
                })
                .collect();
            cells.push(row);
        }
        for &(x, y) in engine.goals() {
            cells[y as usize][x as usize] = Cell::Goal;
        }
        let (bx, by) = engine.ball();
        cells[by as usize][bx as usize] = Cell::Ball;

        self.cells = cells;
        self.maze_name = map.name().to_string();
        self.maze_number = (engine.map_index() + 1, engine.map_count());
        self.remaining_goals = engine.remaining_goals();
        self.moves = engine.moves();
    }

    /// Update terminal dimensions. Returns true if dimensions actually changed
    pub fn update_terminal_size(&mut self, width: u16, height: u16) -> bool {
        let changed = self.viewport_width != width || self.viewport_height != height;
        if changed {
            self.viewport_width = width;
            self.viewport_height = height;
        }
        changed
    }

    /// Whether the maze, two columns per cell plus the menu and status rows, fits the viewport.
    pub fn maze_fits(&self) -> bool {
        let rows = self.cells.len();
        let columns = self.cells.first().map_or(0, Vec::len) * 2;
        columns <= self.viewport_width as usize && rows + 2 <= self.viewport_height as usize
    }

    /// Format the complete status line for this view state
    pub fn format_status_line(&self) -> String {
        self.status_line.format_status_line(&StatusFields {
            maze_name: &self.maze_name,
            maze_number: self.maze_number,
            remaining_goals: self.remaining_goals,
            moves: self.moves,
            last_direction: self.last_direction,
            paused: self.paused,
        })
    }
}

/// Values shown on the status line, borrowed from a `ViewState`.
#[derive(Debug, Clone, Copy)]
pub struct StatusFields<'a> {
    pub maze_name: &'a str,
    pub maze_number: (usize, usize),
    pub remaining_goals: usize,
    pub moves: u32,
    pub last_direction: Direction,
    pub paused: bool,
}

/// Status line information
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub message: Option<String>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a temporary message
    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    /// Clear any temporary message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn format_status_line(&self, fields: &StatusFields) -> String {
        let (number, count) = fields.maze_number;
        let mut status = format!(
            "{} ({}/{}) | goals: {} | moves: {}",
            fields.maze_name, number, count, fields.remaining_goals, fields.moves
        );
        if !fields.last_direction.is_none() {
            status.push_str(" | last: ");
            status.push_str(fields.last_direction.as_str());
        }
        if fields.paused {
            status.push_str(" | paused");
        }
        if let Some(ref message) = self.message {
            status.push_str(" | ");
            status.push_str(message);
        }
        status
    }
}
