//! Gesture resolution: pointer drags and directional keys into roll commands.
//!
//! [`GestureTracker`] summarises a pointer drag as a release velocity, [`resolve_fling`] and
//! [`resolve_key`] turn velocities and keys into a [`Direction`], and [`GestureResolver`]
//! forwards each resolved direction to the engine exactly once.

use crate::engine::{Direction, Engine};
use log::debug;
use ratatui::crossterm::event::KeyCode;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default trailing window used to estimate release velocity.
pub const DEFAULT_VELOCITY_WINDOW_MS: u64 = 100;
/// Default minimum speed (cells per second, either axis) for a release to count as a fling.
pub const DEFAULT_MIN_FLING_VELOCITY: f32 = 8.0;
/// Default row-to-column scale; terminal cells are roughly twice as tall as wide.
pub const DEFAULT_CELL_ASPECT: f32 = 2.0;

/// Release velocity of a recognised fling, in columns per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub vx: f32,
    pub vy: f32,
}

impl GestureSample {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn direction(self) -> Direction {
        resolve_fling(self.vx, self.vy)
    }
}

/// Resolve a fling velocity into one of the four roll directions.
///
/// The dominant axis wins. Equal magnitudes (including the zero vector) resolve vertically,
/// so `(0, 0)` is `Down` and `(-5, -5)` is `Up`. Never returns `Direction::None`.
pub fn resolve_fling(vx: f32, vy: f32) -> Direction {
    if vx.abs() > vy.abs() {
        if vx < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if vy < 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Resolve a key into a roll direction; `Direction::None` means the key is not handled here.
pub fn resolve_key(key: KeyCode) -> Direction {
    match key {
        KeyCode::Left => Direction::Left,
        KeyCode::Right => Direction::Right,
        KeyCode::Up => Direction::Up,
        KeyCode::Down => Direction::Down,
        _ => Direction::None,
    }
}

/// Tuning for [`GestureTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub velocity_window: Duration,
    pub min_fling_velocity: f32,
    pub cell_aspect: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            velocity_window: Duration::from_millis(DEFAULT_VELOCITY_WINDOW_MS),
            min_fling_velocity: DEFAULT_MIN_FLING_VELOCITY,
            cell_aspect: DEFAULT_CELL_ASPECT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PointerSample {
    column: f32,
    row: f32,
    at: Instant,
}

/// Tracks one pointer drag at a time and reports a fling on release.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    samples: VecDeque<PointerSample>,
    active: bool,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            samples: VecDeque::new(),
            active: false,
        }
    }

    /// True while a pointer is held down.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start a new gesture, discarding any unfinished one.
    pub fn pointer_down(&mut self, column: u16, row: u16, now: Instant) {
        self.samples.clear();
        self.active = true;
        self.push(column, row, now);
    }

    pub fn pointer_move(&mut self, column: u16, row: u16, now: Instant) {
        if self.active {
            self.push(column, row, now);
        }
    }

    /// Finish the gesture. Returns a sample only when the release was fast enough.
    pub fn pointer_up(&mut self, column: u16, row: u16, now: Instant) -> Option<GestureSample> {
        if !self.active {
            return None;
        }
        self.push(column, row, now);
        self.active = false;

        let sample = self.release_velocity();
        self.samples.clear();
        sample.filter(|s| {
            s.vx.abs() > self.config.min_fling_velocity
                || s.vy.abs() > self.config.min_fling_velocity
        })
    }

    pub fn cancel(&mut self) {
        self.samples.clear();
        self.active = false;
    }

    fn push(&mut self, column: u16, row: u16, now: Instant) {
        self.samples.push_back(PointerSample {
            column: column as f32,
            row: row as f32,
            at: now,
        });
        while let Some(front) = self.samples.front() {
            if now.saturating_duration_since(front.at) > self.config.velocity_window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn release_velocity(&self) -> Option<GestureSample> {
        let first = self.samples.front()?;
        let last = self.samples.back()?;
        let elapsed = last.at.saturating_duration_since(first.at).as_secs_f32();
        if elapsed <= 0.0 {
            return None;
        }
        Some(GestureSample {
            vx: (last.column - first.column) / elapsed,
            vy: (last.row - first.row) * self.config.cell_aspect / elapsed,
        })
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Forwards resolved directions to the engine.
#[derive(Debug, Default)]
pub struct GestureResolver {
    last: Direction,
    dispatched: u64,
}

impl GestureResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a fling and roll the ball that way.
    pub fn fling<E: Engine + ?Sized>(&mut self, engine: &mut E, sample: GestureSample) -> Direction {
        let direction = sample.direction();
        self.dispatch(engine, direction);
        direction
    }

    /// Resolve a key press. Returns whether the key was handled.
    pub fn key<E: Engine + ?Sized>(&mut self, engine: &mut E, key: KeyCode) -> bool {
        let direction = resolve_key(key);
        self.dispatch(engine, direction)
    }

    /// Most recently dispatched direction, `None` before the first one.
    pub fn last(&self) -> Direction {
        self.last
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    fn dispatch<E: Engine + ?Sized>(&mut self, engine: &mut E, direction: Direction) -> bool {
        if direction.is_none() {
            return false;
        }
        debug!("roll {}", direction.as_str());
        engine.roll_ball(direction);
        self.last = direction;
        self.dispatched += 1;
        true
    }
}
