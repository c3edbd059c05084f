//! Bundled maze engine.
//!
//! The ball rolls one cell per tick in the commanded direction until a wall stops it. Goals
//! disappear as the ball passes over them; clearing the last goal loads the next map. Ticks
//! only advance the ball while the listener is registered, so a backgrounded game is frozen.

use crate::engine::maps::{builtin_maps, MazeMap};
use crate::engine::{Direction, Engine, EngineCommand, LifecycleSnapshot};
use crate::error::{Result, TiltMazeError};
use log::{debug, info, warn};

const KEY_MAP: &str = "map";
const KEY_MAP_NAME: &str = "map_name";
const KEY_BALL: &str = "ball";
const KEY_GOALS: &str = "goals";
const KEY_ROLLING: &str = "rolling";
const KEY_MOVES: &str = "moves";

/// Something noteworthy that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    GoalReached { remaining: usize },
    MapCompleted { name: String, moves: u32 },
}

pub struct MazeEngine {
    maps: Vec<MazeMap>,
    map_index: usize,
    ball: (u16, u16),
    goals: Vec<(u16, u16)>,
    rolling: Direction,
    moves: u32,
    listening: bool,
}

impl MazeEngine {
    /// Engine over the built-in map sequence, positioned at the first map.
    pub fn new() -> Result<Self> {
        Self::with_maps(builtin_maps()?)
    }

    pub fn with_maps(maps: Vec<MazeMap>) -> Result<Self> {
        let first = maps
            .first()
            .ok_or_else(|| TiltMazeError::other("engine needs at least one map"))?;
        let ball = first.start();
        let goals = first.goals().to_vec();
        Ok(Self {
            maps,
            map_index: 0,
            ball,
            goals,
            rolling: Direction::None,
            moves: 0,
            listening: false,
        })
    }

    pub fn map(&self) -> &MazeMap {
        &self.maps[self.map_index]
    }

    pub fn map_index(&self) -> usize {
        self.map_index
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    pub fn ball(&self) -> (u16, u16) {
        self.ball
    }

    pub fn goals(&self) -> &[(u16, u16)] {
        &self.goals
    }

    pub fn remaining_goals(&self) -> usize {
        self.goals.len()
    }

    pub fn rolling(&self) -> Direction {
        self.rolling
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Advance the ball by one cell. No-op while unsubscribed or at rest.
    pub fn tick(&mut self) -> Option<EngineEvent> {
        if !self.listening || self.rolling.is_none() {
            return None;
        }

        let next = match self.step_from(self.ball, self.rolling) {
            Some(next) => next,
            None => {
                self.rolling = Direction::None;
                return None;
            }
        };
        self.ball = next;

        let mut event = None;
        if let Some(idx) = self.goals.iter().position(|goal| *goal == next) {
            self.goals.remove(idx);
            if self.goals.is_empty() {
                let name = self.map().name().to_string();
                let moves = self.moves;
                info!("map `{}` completed in {} moves", name, moves);
                self.load_map((self.map_index + 1) % self.maps.len());
                return Some(EngineEvent::MapCompleted { name, moves });
            }
            event = Some(EngineEvent::GoalReached {
                remaining: self.goals.len(),
            });
        }

        if self.step_from(self.ball, self.rolling).is_none() {
            self.rolling = Direction::None;
        }
        event
    }

    fn step_from(&self, (x, y): (u16, u16), direction: Direction) -> Option<(u16, u16)> {
        let (dx, dy) = direction.delta();
        let (nx, ny) = (x as i32 + dx, y as i32 + dy);
        if direction.is_none() || self.map().is_wall(nx, ny) {
            None
        } else {
            Some((nx as u16, ny as u16))
        }
    }

    fn load_map(&mut self, index: usize) {
        self.map_index = index;
        let map = &self.maps[index];
        self.ball = map.start();
        self.goals = map.goals().to_vec();
        self.rolling = Direction::None;
        self.moves = 0;
        debug!("loaded map {} `{}`", index, map.name());
    }
}

/// Open floor cell at `pos`, if any.
fn open_cell(map: &MazeMap, (x, y): (i64, i64)) -> Option<(u16, u16)> {
    if x < 0 || y < 0 || x >= map.width() as i64 || y >= map.height() as i64 {
        return None;
    }
    if map.is_wall(x as i32, y as i32) {
        return None;
    }
    Some((x as u16, y as u16))
}

impl Engine for MazeEngine {
    fn roll_ball(&mut self, direction: Direction) {
        if direction.is_none() || !self.rolling.is_none() {
            return;
        }
        if self.step_from(self.ball, direction).is_none() {
            debug!("roll {} blocked at {:?}", direction.as_str(), self.ball);
            return;
        }
        self.rolling = direction;
        self.moves = self.moves.saturating_add(1);
    }

    fn register_listener(&mut self) {
        self.listening = true;
    }

    fn unregister_listener(&mut self) {
        self.listening = false;
    }

    fn save_state(&self) -> LifecycleSnapshot {
        let mut snapshot = LifecycleSnapshot::new();
        snapshot.put_int(KEY_MAP, self.map_index as i64);
        snapshot.put_text(KEY_MAP_NAME, self.map().name());
        snapshot.put_pairs(KEY_BALL, vec![(self.ball.0 as i64, self.ball.1 as i64)]);
        snapshot.put_pairs(
            KEY_GOALS,
            self.goals
                .iter()
                .map(|&(x, y)| (x as i64, y as i64))
                .collect(),
        );
        snapshot.put_text(KEY_ROLLING, self.rolling.as_str());
        snapshot.put_int(KEY_MOVES, self.moves as i64);
        snapshot
    }

    fn restore_state(&mut self, snapshot: Option<&LifecycleSnapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };

        let Some(index) = snapshot
            .int(KEY_MAP)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < self.maps.len())
        else {
            warn!("snapshot names no playable map; ignoring it");
            return;
        };
        let map = &self.maps[index];
        if snapshot.text(KEY_MAP_NAME).is_some_and(|name| name != map.name()) {
            warn!("snapshot map name does not match map {}; ignoring it", index);
            return;
        }

        let ball = snapshot
            .pairs(KEY_BALL)
            .and_then(|pairs| pairs.first().copied())
            .and_then(|pos| open_cell(map, pos));
        let Some(ball) = ball else {
            warn!("snapshot ball position is invalid; ignoring it");
            return;
        };

        let goals: Vec<(u16, u16)> = snapshot
            .pairs(KEY_GOALS)
            .unwrap_or_default()
            .iter()
            .filter_map(|&pos| open_cell(map, pos))
            .filter(|pos| map.goals().contains(pos))
            .collect();
        if goals.is_empty() {
            warn!("snapshot has no remaining goals; ignoring it");
            return;
        }

        self.map_index = index;
        self.ball = ball;
        self.goals = goals;
        self.rolling = snapshot
            .text(KEY_ROLLING)
            .map(Direction::from_name)
            .unwrap_or_default();
        self.moves = snapshot
            .int(KEY_MOVES)
            .and_then(|m| u32::try_from(m).ok())
            .unwrap_or(0);
        debug!(
            "restored map {} with ball at {:?} and {} goals",
            index,
            self.ball,
            self.goals.len()
        );
    }

    fn send_command(&mut self, command: EngineCommand) {
        let count = self.maps.len();
        let index = match command {
            EngineCommand::Restart => self.map_index,
            EngineCommand::MapPrevious => (self.map_index + count - 1) % count,
            EngineCommand::MapNext => (self.map_index + 1) % count,
        };
        debug!("engine command {:?}", command);
        self.load_map(index);
    }
}
