//! Candidate generation and move ordering

use crate::board::{Bitboard, Board, Pos, Stone};
use crate::eval::{EvalOptions, PositionEvaluator};
use crate::rules::ForbiddenRule;

/// Chebyshev radius around existing stones that candidates are drawn from
pub const CANDIDATE_RADIUS: i32 = 2;

/// Inputs for ordering one node's moves
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    /// Best move remembered by the transposition table
    pub tt_move: Option<Pos>,
    /// Sort by static evaluation (otherwise by center distance only)
    pub use_static_eval: bool,
    pub options: &'a EvalOptions,
    pub rule: &'a dyn ForbiddenRule,
}

/// Empty, non-forbidden squares near existing stones.
///
/// An empty board yields the center. If nothing near the stones is playable
/// the whole board is considered, so an empty result means no legal move.
pub fn candidate_moves(board: &Board, color: Stone, rule: &dyn ForbiddenRule) -> Vec<Pos> {
    if board.is_board_empty() {
        return vec![Pos::CENTER];
    }

    let mut near = Bitboard::new();
    for pos in board.occupied().iter_ones() {
        for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                if let Some(p) = pos.step(dr, dc, 1) {
                    near.set(p);
                }
            }
        }
    }
    let near = near.difference(&board.occupied());

    let legal = |p: &Pos| !rule.is_forbidden(board, *p, color);
    let moves: Vec<Pos> = near.iter_ones().filter(legal).collect();
    if !moves.is_empty() {
        return moves;
    }
    board.empty_cells().filter(legal).collect()
}

/// Candidates with their ordering scores, best first.
///
/// The TT move (when legal) leads with `i32::MAX`. Ties fall back to center
/// distance, then row-major index.
pub fn generate_scored_moves(board: &Board, color: Stone, ctx: &MoveContext<'_>) -> Vec<(Pos, i32)> {
    let moves = candidate_moves(board, color, ctx.rule);
    let mut scored: Vec<(Pos, i32)> = if ctx.use_static_eval {
        let evaluator = PositionEvaluator::new(board, color, ctx.options, ctx.rule);
        moves.into_iter().map(|p| (p, evaluator.evaluate(p))).collect()
    } else {
        moves.into_iter().map(|p| (p, 0)).collect()
    };

    if let Some(tt_move) = ctx.tt_move {
        if let Some(entry) = scored.iter_mut().find(|(p, _)| *p == tt_move) {
            entry.1 = i32::MAX;
        }
    }

    scored.sort_unstable_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.center_distance().cmp(&b.0.center_distance()))
            .then_with(|| a.0.cmp(&b.0))
    });
    scored
}

/// Ordered candidate squares for `color`. Never returns an occupied square.
pub fn generate_sorted_moves(board: &Board, color: Stone, ctx: &MoveContext<'_>) -> Vec<Pos> {
    generate_scored_moves(board, color, ctx)
        .into_iter()
        .map(|(p, _)| p)
        .collect()
}
