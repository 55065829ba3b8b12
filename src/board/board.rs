//! Board structure and scoped trial moves

use std::ops::{Deref, DerefMut};

use super::bitboard::Bitboard;
use super::{Pos, Stone, BOARD_SIZE, TOTAL_CELLS};
use crate::error::EngineError;

/// Game board: one bitboard per color
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
        }
    }

    /// Build a board from a row-major grid.
    ///
    /// Fails unless the grid is exactly 15 rows of 15 cells.
    pub fn from_rows(rows: &[Vec<Stone>]) -> Result<Self, EngineError> {
        if rows.len() != BOARD_SIZE {
            return Err(EngineError::InvalidInput(format!(
                "board has {} rows, expected {BOARD_SIZE}",
                rows.len()
            )));
        }
        let mut board = Self::new();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != BOARD_SIZE {
                return Err(EngineError::InvalidInput(format!(
                    "row {r} has {} cells, expected {BOARD_SIZE}",
                    row.len()
                )));
            }
            for (c, &stone) in row.iter().enumerate() {
                board.place_stone(Pos::new(r as u8, c as u8), stone);
            }
        }
        Ok(board)
    }

    /// Parse a text diagram: 15 non-blank lines of `.` (empty), `X` (black)
    /// and `O` (white). Whitespace inside a line is ignored.
    pub fn from_diagram(text: &str) -> Result<Self, EngineError> {
        let mut rows = Vec::with_capacity(BOARD_SIZE);
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let mut row = Vec::with_capacity(BOARD_SIZE);
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                let stone = match ch {
                    '.' | '+' => Stone::Empty,
                    'X' | 'x' => Stone::Black,
                    'O' | 'o' => Stone::White,
                    other => {
                        return Err(EngineError::InvalidInput(format!(
                            "unexpected character '{other}' in board diagram"
                        )))
                    }
                };
                row.push(stone);
            }
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    /// Replay a game record, Black first and colors alternating.
    pub fn from_moves(moves: &[Pos]) -> Result<Self, EngineError> {
        let mut board = Self::new();
        let mut color = Stone::Black;
        for (i, &pos) in moves.iter().enumerate() {
            if !board.is_empty(pos) {
                return Err(EngineError::InvalidInput(format!(
                    "move {} at {pos} is already occupied",
                    i + 1
                )));
            }
            board.place_stone(pos, color);
            color = color.opponent();
        }
        Ok(board)
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Place a stone. Placing `Empty` is a no-op.
    #[inline]
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        debug_assert!(stone == Stone::Empty || self.is_empty(pos));
        match stone {
            Stone::Black => self.black.set(pos),
            Stone::White => self.white.set(pos),
            Stone::Empty => {}
        }
    }

    /// Remove a stone
    #[inline]
    pub fn remove_stone(&mut self, pos: Pos) {
        self.black.clear(pos);
        self.white.clear(pos);
    }

    /// Place `stone` at `pos` for the lifetime of the returned guard.
    ///
    /// The stone is removed when the guard drops, on every exit path.
    #[inline]
    pub fn trial(&mut self, pos: Pos, stone: Stone) -> TrialMove<'_> {
        self.place_stone(pos, stone);
        TrialMove { board: self, pos }
    }

    /// Get bitboard for a color (returns None for Empty)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Option<&Bitboard> {
        match stone {
            Stone::Black => Some(&self.black),
            Stone::White => Some(&self.white),
            Stone::Empty => None,
        }
    }

    /// All occupied cells
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.black.union(&self.white)
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    /// Check if board is empty
    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    /// Check if every cell is occupied
    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() as usize == TOTAL_CELLS
    }

    /// Iterate over empty cells in row-major order
    pub fn empty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..TOTAL_CELLS)
            .map(Pos::from_index)
            .filter(move |&p| self.is_empty(p))
    }

    /// Render as a diagram accepted by [`Board::from_diagram`]
    pub fn to_diagram(&self) -> String {
        let mut out = String::with_capacity(TOTAL_CELLS + BOARD_SIZE);
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                out.push(match self.get(Pos::new(r as u8, c as u8)) {
                    Stone::Empty => '.',
                    Stone::Black => 'X',
                    Stone::White => 'O',
                });
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// A stone placed for the duration of a scope.
///
/// Derefs to the board so nested searches can keep placing trial stones.
pub struct TrialMove<'a> {
    board: &'a mut Board,
    pos: Pos,
}

impl Deref for TrialMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for TrialMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for TrialMove<'_> {
    fn drop(&mut self) {
        self.board.remove_stone(self.pos);
    }
}
