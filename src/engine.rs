//! Engine contract consumed by the input and lifecycle core.
//!
//! The engine owns maze state, ball motion, and map sequencing. The gesture resolver and the
//! lifecycle coordinator talk to it only through the [`Engine`] trait, so any engine (the
//! bundled [`MazeEngine`] or a test double) can sit behind them.

pub mod maps;
pub mod maze;
pub mod snapshot;

pub use maze::MazeEngine;
pub use snapshot::{LifecycleSnapshot, SnapshotValue};

/// Discrete roll command produced from a gesture or key press.
///
/// `None` is a sentinel: it marks "nothing resolved yet" or "key not handled" and is never
/// forwarded to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// True for the sentinel value.
    pub fn is_none(self) -> bool {
        matches!(self, Direction::None)
    }

    /// Column/row step for one cell of movement.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Stable name used in snapshots and the status line.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Inverse of [`Direction::as_str`]. Unknown names map to `None`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "up" => Direction::Up,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "right" => Direction::Right,
            _ => Direction::None,
        }
    }
}

/// Out-of-band commands triggered from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Restart,
    MapPrevious,
    MapNext,
}

/// Narrow contract the core uses on the game engine.
///
/// None of these operations fail: the engine is assumed healthy for the lifetime of the
/// session that owns it.
pub trait Engine {
    /// Apply a movement command. Fire-and-forget.
    fn roll_ball(&mut self, direction: Direction);

    /// Start receiving tilt/tick callbacks. Registering twice is a no-op.
    fn register_listener(&mut self);

    /// Stop receiving callbacks. Unregistering twice is a no-op.
    fn unregister_listener(&mut self);

    /// Capture the state needed to resume the current game.
    fn save_state(&self) -> LifecycleSnapshot;

    /// Replace snapshot-derived state. `None` means there is nothing to restore.
    fn restore_state(&mut self, snapshot: Option<&LifecycleSnapshot>);

    /// Handle a menu command.
    fn send_command(&mut self, command: EngineCommand);
}
