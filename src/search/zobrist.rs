//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when placing or removing stones,
//! which keeps transposition table and VCF memo lookups cheap during search.
//!
//! # Example
//!
//! ```
//! use renju::board::{Board, Stone, Pos};
//! use renju::search::ZobristTable;
//!
//! let zt = ZobristTable::new();
//! let mut board = Board::new();
//!
//! let hash1 = zt.hash(&board, Stone::Black);
//!
//! let pos = Pos::new(7, 7);
//! board.place_stone(pos, Stone::Black);
//! let hash2 = zt.hash(&board, Stone::White);
//!
//! // Incremental update is equivalent to full recomputation
//! assert_eq!(zt.update_place(hash1, pos, Stone::Black), hash2);
//! ```

use crate::board::{Board, Pos, Stone, TOTAL_CELLS};

/// Zobrist hash table for position hashing.
///
/// XOR-based hashing with precomputed random values for each
/// (position, stone color) combination plus a side-to-move key.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    /// Random values for black stones at each position
    black: [u64; TOTAL_CELLS],
    /// Random values for white stones at each position
    white: [u64; TOTAL_CELLS],
    /// Random value XORed when black is to move
    black_to_move: u64,
}

impl ZobristTable {
    /// Create a new Zobrist table with deterministic random values.
    ///
    /// A fixed-seed LCG keeps hashes identical across runs.
    #[must_use]
    pub fn new() -> Self {
        // Constants from Knuth's MMIX LCG
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            // High bits of an LCG are the well-mixed ones
            seed ^ (seed >> 29)
        };

        let mut black = [0u64; TOTAL_CELLS];
        let mut white = [0u64; TOTAL_CELLS];
        for i in 0..TOTAL_CELLS {
            black[i] = next_rand();
            white[i] = next_rand();
        }

        Self {
            black,
            white,
            black_to_move: next_rand(),
        }
    }

    /// Compute the full hash for a board position.
    #[must_use]
    pub fn hash(&self, board: &Board, side_to_move: Stone) -> u64 {
        let mut h = 0u64;

        for pos in board.black.iter_ones() {
            h ^= self.black[pos.to_index()];
        }
        for pos in board.white.iter_ones() {
            h ^= self.white[pos.to_index()];
        }
        if side_to_move == Stone::Black {
            h ^= self.black_to_move;
        }

        h
    }

    /// Incrementally update hash after placing a stone.
    ///
    /// Also toggles the side-to-move component.
    #[inline]
    #[must_use]
    pub fn update_place(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        let idx = pos.to_index();
        let stone_hash = match stone {
            Stone::Black => self.black[idx],
            Stone::White => self.white[idx],
            Stone::Empty => 0,
        };
        hash ^ stone_hash ^ self.black_to_move
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_empty_board() {
        let zt = ZobristTable::new();
        let board = Board::new();
        assert_eq!(zt.hash(&board, Stone::White), 0);
        assert_ne!(zt.hash(&board, Stone::Black), 0);
    }

    #[test]
    fn test_zobrist_deterministic() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        assert_eq!(
            ZobristTable::new().hash(&board, Stone::White),
            ZobristTable::new().hash(&board, Stone::White)
        );
    }

    #[test]
    fn test_zobrist_same_position_different_path() {
        let zt = ZobristTable::new();
        let start = zt.hash(&Board::new(), Stone::Black);
        let a = Pos::new(7, 7);
        let b = Pos::new(6, 8);
        let c = Pos::new(8, 6);

        let h1 = zt.update_place(start, a, Stone::Black);
        let h1 = zt.update_place(h1, b, Stone::White);
        let h1 = zt.update_place(h1, c, Stone::Black);

        let h2 = zt.update_place(start, c, Stone::Black);
        let h2 = zt.update_place(h2, b, Stone::White);
        let h2 = zt.update_place(h2, a, Stone::Black);

        assert_eq!(h1, h2);
    }

    #[test]
    fn test_zobrist_undo() {
        let zt = ZobristTable::new();
        let start = zt.hash(&Board::new(), Stone::Black);
        let pos = Pos::new(3, 11);
        let placed = zt.update_place(start, pos, Stone::Black);
        assert_ne!(placed, start);
        assert_eq!(zt.update_place(placed, pos, Stone::Black), start);
    }

    #[test]
    fn test_zobrist_collision_resistance() {
        let zt = ZobristTable::new();
        let mut seen = std::collections::HashSet::new();
        for idx in 0..TOTAL_CELLS {
            let mut board = Board::new();
            board.place_stone(Pos::from_index(idx), Stone::Black);
            assert!(seen.insert(zt.hash(&board, Stone::White)));
            let mut board = Board::new();
            board.place_stone(Pos::from_index(idx), Stone::White);
            assert!(seen.insert(zt.hash(&board, Stone::White)));
        }
    }
}
