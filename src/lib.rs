//! # tiltmaze - Terminal Tilt-Maze Puzzle
//!
//! Roll a ball through a maze and collect every goal. Swipe with the mouse or use the arrow
//! keys; the game checkpoints itself whenever the terminal loses focus or the player quits.
//!
//! ## Architecture
//!
//! - [`input`] - Raw terminal events, fling recognition, and key/menu mapping
//! - [`lifecycle`] - Keeps engine listeners and snapshots in step with visibility changes
//! - [`engine`] - The engine contract plus the bundled maze engine
//! - [`persist`] - Snapshot file storage across process restarts
//! - [`config`] - TOML configuration
//! - [`ui`] - ratatui rendering behind the `UIRenderer` trait
//! - [`app`] - The game session tying them together

// Core modules
pub mod config;
pub mod error;

// Core components
pub mod engine;
pub mod input;
pub mod lifecycle;
pub mod persist;

// Host shell
pub mod app;
pub mod ui;

// Re-export commonly used types for convenience
pub use error::{Result, TiltMazeError};

pub use app::Application;
pub use engine::{Direction, Engine, EngineCommand, LifecycleSnapshot};
pub use input::{resolve_fling, resolve_key, GestureResolver, GestureSample};
pub use lifecycle::{LifecycleCoordinator, LifecycleState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
