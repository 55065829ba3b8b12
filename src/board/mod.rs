//! Board representation for renju

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// Re-exports
pub use bitboard::Bitboard;
pub use board::{Board, TrialMove};

/// Board size (15x15)
pub const BOARD_SIZE: usize = 15;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 225

/// Direction vectors for the four line axes
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stone::Empty => "empty",
            Stone::Black => "black",
            Stone::White => "white",
        };
        f.write_str(name)
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    /// Board center, the opening move on an empty board.
    pub const CENTER: Pos = Pos {
        row: (BOARD_SIZE / 2) as u8,
        col: (BOARD_SIZE / 2) as u8,
    };

    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self { row, col }
    }

    /// Checked constructor for caller-supplied coordinates.
    pub fn try_new(row: i32, col: i32) -> Result<Self, EngineError> {
        if Self::is_valid(row, col) {
            Ok(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(EngineError::InvalidInput(format!(
                "coordinate ({row}, {col}) outside the {BOARD_SIZE}x{BOARD_SIZE} board"
            )))
        }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Position `k` steps along `(dr, dc)`, or `None` off the board.
    #[inline]
    pub fn step(self, dr: i32, dc: i32, k: i32) -> Option<Pos> {
        let r = i32::from(self.row) + dr * k;
        let c = i32::from(self.col) + dc * k;
        if Self::is_valid(r, c) {
            Some(Pos {
                row: r as u8,
                col: c as u8,
            })
        } else {
            None
        }
    }

    /// Manhattan distance to the board center
    #[inline]
    pub fn center_distance(self) -> i32 {
        let center = (BOARD_SIZE / 2) as i32;
        (i32::from(self.row) - center).abs() + (i32::from(self.col) - center).abs()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}
