//! VCF (Victory by Continuous Fours) search
//!
//! The attacker plays only fours, so every defender reply is forced to the
//! single square that blocks the five. The search succeeds when the attacker
//! reaches a five, a double five-threat, or a four whose only block is a
//! forbidden square for the defender.
//!
//! # Example
//!
//! ```
//! use renju::board::{Board, Pos, Stone};
//! use renju::rules::Renju;
//! use renju::search::{VcfLimits, VcfSearcher};
//!
//! let mut board = Board::new();
//! for col in 4..8 {
//!     board.place_stone(Pos::new(7, col), Stone::White);
//! }
//!
//! let mut vcf = VcfSearcher::new(&Renju, VcfLimits::default());
//! let win = vcf.find_vcf_move(&board, Stone::White);
//! assert!(win == Some(Pos::new(7, 3)) || win == Some(Pos::new(7, 8)));
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::board::{Board, Pos, Stone};
use crate::eval::line::five_points_through;
use crate::eval::{five_points, four_moves};
use crate::rules::ForbiddenRule;

use super::zobrist::ZobristTable;

/// Budget for one VCF search (or a family of searches sharing a deadline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcfLimits {
    /// Wall-clock budget measured from [`VcfSearcher::new`]
    pub time_limit: Option<Duration>,
    /// Maximum number of attacker fours in one line
    pub max_depth: usize,
    /// Maximum attacker nodes across every search run by the searcher
    pub node_limit: Option<u64>,
}

impl Default for VcfLimits {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_millis(100)),
            max_depth: 20,
            node_limit: None,
        }
    }
}

impl VcfLimits {
    /// Limits with a time budget in milliseconds and default depth.
    pub fn with_time_ms(ms: u64) -> Self {
        Self {
            time_limit: Some(Duration::from_millis(ms)),
            ..Self::default()
        }
    }
}

/// Depth-first VCF searcher.
///
/// Positions proven not to win are memoized by Zobrist hash together with
/// the remaining depth they were refuted at. Results found after the budget
/// ran out are never memoized.
pub struct VcfSearcher<'a> {
    rule: &'a dyn ForbiddenRule,
    limits: VcfLimits,
    deadline: Option<Instant>,
    nodes: u64,
    aborted: bool,
    failed: HashMap<u64, usize>,
    zobrist: ZobristTable,
}

impl<'a> VcfSearcher<'a> {
    pub fn new(rule: &'a dyn ForbiddenRule, limits: VcfLimits) -> Self {
        Self {
            rule,
            limits,
            deadline: limits.time_limit.map(|d| Instant::now() + d),
            nodes: 0,
            aborted: false,
            failed: HashMap::new(),
            zobrist: ZobristTable::new(),
        }
    }

    /// Attacker nodes visited so far
    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Whether the last search stopped on the time or node budget
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Whether the shared budget is already spent
    pub fn budget_exhausted(&self) -> bool {
        self.limits.node_limit.is_some_and(|n| self.nodes >= n)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// First move of a winning VCF line for `color`, if one exists.
    pub fn find_vcf_move(&mut self, board: &Board, color: Stone) -> Option<Pos> {
        self.find_vcf_sequence(board, color).and_then(|seq| seq.first().copied())
    }

    /// Full winning line for `color`: attacker and defender moves alternate,
    /// starting and ending with an attacker move. The board is not modified.
    pub fn find_vcf_sequence(&mut self, board: &Board, color: Stone) -> Option<Vec<Pos>> {
        if color == Stone::Empty {
            return None;
        }
        self.aborted = false;
        let mut work = board.clone();
        let hash = self.zobrist.hash(&work, color);
        let mut sequence = Vec::new();
        if self.attack(&mut work, color, hash, 0, &mut sequence) {
            Some(sequence)
        } else {
            None
        }
    }

    fn attack(
        &mut self,
        board: &mut Board,
        color: Stone,
        hash: u64,
        depth: usize,
        sequence: &mut Vec<Pos>,
    ) -> bool {
        if self.aborted {
            return false;
        }
        if self.limits.node_limit.is_some_and(|n| self.nodes >= n) {
            self.aborted = true;
            return false;
        }
        self.nodes += 1;
        if self.nodes % 32 == 0 && self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.aborted = true;
            return false;
        }

        let rule = self.rule;
        if let Some(&five) = five_points(board, color, rule).first() {
            sequence.push(five);
            return true;
        }

        let remaining = self.limits.max_depth.saturating_sub(depth);
        if remaining == 0 {
            return false;
        }
        if self.failed.get(&hash).is_some_and(|&r| r >= remaining) {
            return false;
        }

        let opp = color.opponent();
        let opp_fives = five_points(board, opp, rule);
        if opp_fives.len() >= 2 {
            self.remember_failure(hash, remaining);
            return false;
        }

        let mut candidates = four_moves(board, color, rule);
        if let Some(&must_block) = opp_fives.first() {
            candidates.retain(|&m| m == must_block);
        }

        let exact = rule.exact_five(color);
        let defender_restricted = rule.restricted_color() == Some(opp);
        for m in candidates {
            let mut after = board.trial(m, color);
            let threats = five_points_through(&after, m, color, exact);
            let block = match threats.as_slice() {
                [] => continue,
                [block] => *block,
                _ => {
                    sequence.push(m);
                    return true;
                }
            };
            if defender_restricted && rule.is_forbidden(&after, block, opp) {
                log::trace!("vcf: {} cannot block {} (forbidden)", opp, block);
                sequence.push(m);
                return true;
            }

            let h1 = self.zobrist.update_place(hash, m, color);
            let h2 = self.zobrist.update_place(h1, block, opp);
            let mut reply = after.trial(block, opp);
            sequence.push(m);
            sequence.push(block);
            if self.attack(&mut reply, color, h2, depth + 1, sequence) {
                return true;
            }
            sequence.truncate(sequence.len() - 2);
            if self.aborted {
                return false;
            }
        }

        self.remember_failure(hash, remaining);
        false
    }

    fn remember_failure(&mut self, hash: u64, remaining: usize) {
        if self.aborted {
            return;
        }
        let entry = self.failed.entry(hash).or_insert(0);
        *entry = (*entry).max(remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Freestyle, Renju};

    fn setup_board(setup: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(r, c, s) in setup {
            board.place_stone(Pos::new(r, c), s);
        }
        board
    }

    fn unlimited() -> VcfLimits {
        VcfLimits {
            time_limit: None,
            max_depth: 20,
            node_limit: None,
        }
    }

    #[test]
    fn test_vcf_immediate_win() {
        let board = setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
            (7, 8, Stone::White),
            (7, 4, Stone::Black),
        ]);
        let mut vcf = VcfSearcher::new(&Renju, unlimited());
        let seq = vcf.find_vcf_sequence(&board, Stone::White).unwrap();
        assert_eq!(seq, vec![Pos::new(7, 9)]);
    }

    #[test]
    fn test_vcf_two_step_win() {
        // White four at (7,7) forces (7,8); then (6,8) makes an open four on
        // the anti-diagonal (9,5)-(6,8)
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (9, 5, Stone::White),
            (8, 6, Stone::White),
        ]);
        let before = board.clone();
        let mut vcf = VcfSearcher::new(&Renju, unlimited());
        let seq = vcf.find_vcf_sequence(&board, Stone::White).unwrap();

        assert_eq!(seq.len(), 3);
        assert_eq!(seq[0], Pos::new(7, 7));
        assert_eq!(seq[1], Pos::new(7, 8));
        assert_eq!(board, before);
    }

    #[test]
    fn test_vcf_not_found() {
        let board = setup_board(&[(7, 6, Stone::Black), (7, 7, Stone::Black)]);
        let mut vcf = VcfSearcher::new(&Renju, unlimited());
        assert!(vcf.find_vcf_move(&board, Stone::Black).is_none());
        assert!(!vcf.is_aborted());
        assert!(vcf.find_vcf_move(&Board::new(), Stone::Black).is_none());
    }

    #[test]
    fn test_vcf_must_answer_opponent_four() {
        // Black's four must be blocked at (0,4), which gives White no four
        let board = setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
            (7, 4, Stone::Black),
            (0, 0, Stone::Black),
            (0, 1, Stone::Black),
            (0, 2, Stone::Black),
            (0, 3, Stone::Black),
        ]);
        let mut vcf = VcfSearcher::new(&Renju, unlimited());
        assert!(vcf.find_vcf_move(&board, Stone::White).is_none());
    }

    #[test]
    fn test_vcf_block_on_forbidden_square_wins() {
        // (7,7) is a double three for Black, so White's four at (8,8) that
        // can only be stopped there wins under renju but not freestyle
        let board = setup_board(&[
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (5, 7, Stone::Black),
            (6, 7, Stone::Black),
            (12, 12, Stone::Black),
            (9, 9, Stone::White),
            (10, 10, Stone::White),
            (11, 11, Stone::White),
        ]);

        let mut vcf = VcfSearcher::new(&Renju, unlimited());
        assert_eq!(vcf.find_vcf_move(&board, Stone::White), Some(Pos::new(8, 8)));

        let mut vcf = VcfSearcher::new(&Freestyle, unlimited());
        assert!(vcf.find_vcf_move(&board, Stone::White).is_none());
    }

    #[test]
    fn test_vcf_node_limit_aborts() {
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (9, 5, Stone::White),
            (8, 6, Stone::White),
        ]);
        let limits = VcfLimits {
            node_limit: Some(1),
            ..unlimited()
        };
        let mut vcf = VcfSearcher::new(&Renju, limits);
        assert!(vcf.find_vcf_move(&board, Stone::White).is_none());
        assert!(vcf.is_aborted());
        assert!(vcf.budget_exhausted());
    }
}
