//! Built-in maze set.
//!
//! Layout legend: `#` wall, `.` floor, `O` ball start, `x` goal.

use crate::error::{Result, TiltMazeError};

/// Parsed maze ready for play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeMap {
    name: String,
    width: u16,
    height: u16,
    walls: Vec<bool>,
    start: (u16, u16),
    goals: Vec<(u16, u16)>,
}

impl MazeMap {
    /// Parse an ASCII layout. Rows must all have the same width and hold exactly one `O`.
    pub fn parse(name: &str, layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(TiltMazeError::other(format!("maze `{name}` is empty")));
        }

        let mut walls = Vec::with_capacity(width * height);
        let mut start = None;
        let mut goals = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(TiltMazeError::other(format!(
                    "maze `{name}` row {y} is not {width} cells wide"
                )));
            }
            for (x, cell) in row.chars().enumerate() {
                let pos = (x as u16, y as u16);
                match cell {
                    '#' => walls.push(true),
                    '.' => walls.push(false),
                    'O' => {
                        if start.replace(pos).is_some() {
                            return Err(TiltMazeError::other(format!(
                                "maze `{name}` has more than one ball"
                            )));
                        }
                        walls.push(false);
                    }
                    'x' => {
                        goals.push(pos);
                        walls.push(false);
                    }
                    other => {
                        return Err(TiltMazeError::other(format!(
                            "maze `{name}` has unknown cell `{other}`"
                        )))
                    }
                }
            }
        }

        let start =
            start.ok_or_else(|| TiltMazeError::other(format!("maze `{name}` has no ball")))?;

        Ok(Self {
            name: name.to_string(),
            width: width as u16,
            height: height as u16,
            walls,
            start,
            goals,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn start(&self) -> (u16, u16) {
        self.start
    }

    pub fn goals(&self) -> &[(u16, u16)] {
        &self.goals
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return true;
        }
        self.walls[y as usize * self.width as usize + x as usize]
    }
}

const BUILTIN: &[(&str, &str)] = &[
    (
        "First Steps",
        "
        #########
        #O.....x#
        #.#####.#
        #.......#
        #########
        ",
    ),
    (
        "Corners",
        "
        ###########
        #x.......x#
        #.###.###.#
        #....O....#
        #.###.###.#
        #x.......x#
        ###########
        ",
    ),
    (
        "Switchback",
        "
        ###########
        #O........#
        #########.#
        #x........#
        #.#########
        #........x#
        ###########
        ",
    ),
    (
        "Pillars",
        "
        ###########
        #x...#...x#
        #.#.....#.#
        #...#O#...#
        #.#.....#.#
        #x...#...x#
        ###########
        ",
    ),
];

/// The bundled map sequence.
pub fn builtin_maps() -> Result<Vec<MazeMap>> {
    BUILTIN
        .iter()
        .map(|(name, layout)| MazeMap::parse(name, layout))
        .collect()
}
