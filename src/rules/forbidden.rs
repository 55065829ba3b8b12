//! Forbidden-move rules
//!
//! Under renju rules Black may not play a double-three, a double-four, or an
//! overline. A move that makes an exact five is always allowed, even if it
//! would otherwise be forbidden. White is unrestricted.
//!
//! Threes are judged by shape alone: a three whose open-four extension is
//! itself forbidden still counts as a three here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone};
use crate::eval::line::MoveShape;

/// Why a move is forbidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForbiddenReason {
    DoubleThree,
    DoubleFour,
    Overline,
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForbiddenReason::DoubleThree => "double-three",
            ForbiddenReason::DoubleFour => "double-four",
            ForbiddenReason::Overline => "overline",
        })
    }
}

/// Verdict of a forbidden-move query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForbiddenCheck {
    pub is_forbidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ForbiddenReason>,
}

impl ForbiddenCheck {
    pub const ALLOWED: ForbiddenCheck = ForbiddenCheck {
        is_forbidden: false,
        reason: None,
    };

    #[inline]
    pub fn forbidden(reason: ForbiddenReason) -> Self {
        Self {
            is_forbidden: true,
            reason: Some(reason),
        }
    }
}

/// The "is this move forbidden for this color" predicate the search consults.
pub trait ForbiddenRule: Send + Sync + fmt::Debug {
    /// Color subject to restrictions, if any
    fn restricted_color(&self) -> Option<Stone>;

    /// Judge `color` playing at the empty square `pos`
    fn check(&self, board: &Board, pos: Pos, color: Stone) -> ForbiddenCheck;

    #[inline]
    fn is_forbidden(&self, board: &Board, pos: Pos, color: Stone) -> bool {
        self.restricted_color() == Some(color) && self.check(board, pos, color).is_forbidden
    }

    /// Whether only an exact five wins for `color` (six or more is an overline)
    #[inline]
    fn exact_five(&self, color: Stone) -> bool {
        self.restricted_color() == Some(color)
    }
}

/// Renju: Black is restricted
#[derive(Debug, Clone, Copy, Default)]
pub struct Renju;

impl ForbiddenRule for Renju {
    fn restricted_color(&self) -> Option<Stone> {
        Some(Stone::Black)
    }

    fn check(&self, board: &Board, pos: Pos, color: Stone) -> ForbiddenCheck {
        if color != Stone::Black || !board.is_empty(pos) {
            return ForbiddenCheck::ALLOWED;
        }
        let shape = MoveShape::analyze(board, pos, color, true);
        if shape.fives() > 0 {
            return ForbiddenCheck::ALLOWED;
        }
        if shape.has_overline() {
            ForbiddenCheck::forbidden(ForbiddenReason::Overline)
        } else if shape.fours() >= 2 {
            ForbiddenCheck::forbidden(ForbiddenReason::DoubleFour)
        } else if shape.open_threes() >= 2 {
            ForbiddenCheck::forbidden(ForbiddenReason::DoubleThree)
        } else {
            ForbiddenCheck::ALLOWED
        }
    }
}

/// Freestyle gomoku: nothing is forbidden, overlines win
#[derive(Debug, Clone, Copy, Default)]
pub struct Freestyle;

impl ForbiddenRule for Freestyle {
    fn restricted_color(&self) -> Option<Stone> {
        None
    }

    fn check(&self, _board: &Board, _pos: Pos, _color: Stone) -> ForbiddenCheck {
        ForbiddenCheck::ALLOWED
    }
}

/// Rule set selector used in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    #[default]
    Renju,
    Freestyle,
}

impl RuleKind {
    pub fn build(self) -> Box<dyn ForbiddenRule> {
        match self {
            RuleKind::Renju => Box::new(Renju),
            RuleKind::Freestyle => Box::new(Freestyle),
        }
    }
}

/// Empty and not forbidden for `color`
#[inline]
pub fn is_valid_move(board: &Board, pos: Pos, color: Stone, rule: &dyn ForbiddenRule) -> bool {
    board.is_empty(pos) && !rule.is_forbidden(board, pos, color)
}
