//! Game rules for renju
//!
//! - Win conditions (exact five for the restricted color)
//! - Forbidden moves (double-three, double-four, overline)

pub mod forbidden;
pub mod win;

// Re-exports for convenient access
pub use forbidden::{
    is_valid_move, ForbiddenCheck, ForbiddenReason, ForbiddenRule, Freestyle, Renju, RuleKind,
};
pub use win::{check_winner, makes_five};
