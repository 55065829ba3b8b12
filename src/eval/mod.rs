//! Position evaluation
//!
//! - [`line`]: per-axis shape classification
//! - [`patterns`]: score weights
//! - [`threats`]: opponent threat detection
//! - [`heuristic`]: square and board evaluation

pub mod heuristic;
pub mod line;
pub mod options;
pub mod patterns;
pub mod threats;

/// Score reserved for a proven win; `-INFINITY` marks illegal or losing squares.
pub const INFINITY: i32 = 10_000_000;

pub use heuristic::{evaluate_board, evaluate_position, PositionEvaluator};
pub use line::{LineShape, MoveShape};
pub use options::EvalOptions;
pub use patterns::PatternScore;
pub use threats::{detect_opponent_threats, five_points, four_moves, scan_points, ThreatReport};
