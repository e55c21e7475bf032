//! `occumap-types` – shared vocabulary for the occupancy mapping stack.
//!
//! Cell addresses, grid dimensions, motion commands, raw observation codes
//! and the global [`MapError`] type live here so that the perception core and
//! the runtime agree on one set of definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A cell address in a grid, `(row, col)` with row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Height and width of a grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    pub height: usize,
    pub width: usize,
}

impl GridDims {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// True when `pos` lies in `[0, height) × [0, width)`.
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.height * self.width
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// A discrete motion command.  `Observe` advances time without moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Observe,
}

impl FromStr for Action {
    type Err = String;

    /// Accepts both the single-letter driver codes (`u`, `d`, `l`, `r`, `o`)
    /// and the lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "up" => Ok(Action::Up),
            "d" | "down" => Ok(Action::Down),
            "l" | "left" => Ok(Action::Left),
            "r" | "right" => Ok(Action::Right),
            "o" | "observe" => Ok(Action::Observe),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Raw 3×3 egocentric observation codes.  The agent sits at `[1][1]`.
pub type ObservationWindow = [[i32; 3]; 3];

/// Code used by sensors for "this cell was not observed".
pub const UNOBSERVED_CODE: i32 = -1;

/// Codes at or above this value are clamped to free.
pub const CLAMP_TO_FREE_CODE: i32 = 3;

/// Ternary per-cell observation after the clamp rule has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Observation {
    Free,
    Occupied,
    Unobserved,
}

impl Observation {
    /// Apply the fixed clamp rule to a raw sensor code.
    ///
    /// `-1` is unobserved, values `>= 3` and `0` are free, anything else is
    /// occupied.
    pub fn from_code(code: i32) -> Self {
        match code {
            UNOBSERVED_CODE => Observation::Unobserved,
            c if c >= CLAMP_TO_FREE_CODE => Observation::Free,
            0 => Observation::Free,
            _ => Observation::Occupied,
        }
    }

    /// `Some(true)` for occupied, `Some(false)` for free, `None` when the
    /// cell must not take part in any update.
    pub fn as_occupied(self) -> Option<bool> {
        match self {
            Observation::Free => Some(false),
            Observation::Occupied => Some(true),
            Observation::Unobserved => None,
        }
    }
}

/// Global error type for grid construction, fusion and fleet operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: GridDims, found: GridDims },

    #[error("Cell count mismatch: expected {expected} cells, found {found}")]
    CellCountMismatch { expected: usize, found: usize },

    #[error("Grid dimensions must be non-zero")]
    EmptyGrid,

    #[error("Position {position} lies outside a {dims} grid")]
    PositionOutOfBounds { position: Position, dims: GridDims },

    #[error("Unknown agent: {0}")]
    UnknownAgent(Uuid),

    #[error("Agent unavailable: {0}")]
    AgentUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
