//! Win condition checking
//!
//! Five in a row wins. For a color bound by the exact-five rule only a run of
//! exactly five counts; six or more does not.

use crate::board::{Board, Pos, Stone, DIRECTIONS};
use crate::eval::line::completes_five;

use super::forbidden::ForbiddenRule;

/// Length of the `color` run through `pos` along `(dr, dc)`, counting `pos` itself.
#[inline]
fn run_through(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> usize {
    let mut count = 1;
    for sign in [1, -1] {
        let mut k = 1;
        while let Some(p) = pos.step(dr * sign, dc * sign, k) {
            if board.get(p) != color {
                break;
            }
            count += 1;
            k += 1;
        }
    }
    count
}

/// Whether the stone at `pos` is part of a winning line.
#[inline]
fn has_five_at_pos(board: &Board, pos: Pos, color: Stone, exact: bool) -> bool {
    DIRECTIONS.iter().any(|&(dr, dc)| {
        let len = run_through(board, pos, color, dr, dc);
        if exact {
            len == 5
        } else {
            len >= 5
        }
    })
}

/// Whether `color` playing the empty square `pos` completes a five.
#[inline]
pub fn makes_five(board: &Board, pos: Pos, color: Stone, rule: &dyn ForbiddenRule) -> bool {
    board.is_empty(pos) && completes_five(board, pos, color, rule.exact_five(color))
}

/// Color with a completed five on the board, if any.
pub fn check_winner(board: &Board, rule: &dyn ForbiddenRule) -> Option<Stone> {
    [Stone::Black, Stone::White].into_iter().find(|&color| {
        let exact = rule.exact_five(color);
        board
            .stones(color)
            .is_some_and(|stones| stones.iter_ones().any(|p| has_five_at_pos(board, p, color, exact)))
    })
}
