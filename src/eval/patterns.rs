//! Pattern scores for renju evaluation
//!
//! These constants define the scoring weights for board patterns. Only the
//! ordering is load-bearing; the magnitudes are tuning knobs.

use super::line::LineShape;

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    // Winning patterns
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;
    /// Threat that wins by force next turn (open four, unanswerable four)
    pub const WINNING_THREAT: i32 = 500_000;

    // Strong attacking patterns
    /// Open four: _OOOO_ (unstoppable)
    pub const OPEN_FOUR: i32 = 100_000;
    /// Stop four: XOOOO_ or OO_OO (one completion square)
    pub const STOP_FOUR: i32 = 50_000;

    // Moderate threats
    /// Open three: _OOO_ (becomes open four if not blocked)
    pub const OPEN_THREE: i32 = 10_000;
    /// Closed three: XOOO_ (can only become a stop four)
    pub const CLOSED_THREE: i32 = 1_500;

    // Building patterns
    /// Open two: _OO_
    pub const OPEN_TWO: i32 = 1_000;
    /// Closed two: XOO_
    pub const CLOSED_TWO: i32 = 200;
    /// Lone stone with room to grow
    pub const ONE: i32 = 10;
}

/// Weight of a single-axis shape
pub fn shape_score(shape: LineShape) -> i32 {
    match shape {
        LineShape::Five => PatternScore::FIVE,
        LineShape::OpenFour | LineShape::DoubleFour => PatternScore::OPEN_FOUR,
        LineShape::StopFour => PatternScore::STOP_FOUR,
        LineShape::OpenThree => PatternScore::OPEN_THREE,
        LineShape::ClosedThree => PatternScore::CLOSED_THREE,
        LineShape::OpenTwo => PatternScore::OPEN_TWO,
        LineShape::ClosedTwo => PatternScore::CLOSED_TWO,
        LineShape::One => PatternScore::ONE,
        LineShape::Dead | LineShape::Overline => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_score_hierarchy() {
        assert!(PatternScore::FIVE > PatternScore::WINNING_THREAT);
        assert!(PatternScore::WINNING_THREAT > PatternScore::OPEN_FOUR);
        assert!(PatternScore::OPEN_FOUR > PatternScore::STOP_FOUR);
        assert!(PatternScore::STOP_FOUR > PatternScore::OPEN_THREE);
        assert!(PatternScore::OPEN_THREE > PatternScore::CLOSED_THREE);
        assert!(PatternScore::CLOSED_THREE > PatternScore::OPEN_TWO);
        assert!(PatternScore::OPEN_TWO > PatternScore::CLOSED_TWO);
        assert!(PatternScore::CLOSED_TWO > PatternScore::ONE);
    }

    #[test]
    fn test_shape_score_follows_shape_order() {
        let shapes = [
            LineShape::One,
            LineShape::ClosedTwo,
            LineShape::OpenTwo,
            LineShape::ClosedThree,
            LineShape::OpenThree,
            LineShape::StopFour,
            LineShape::OpenFour,
            LineShape::Five,
        ];
        for pair in shapes.windows(2) {
            assert!(shape_score(pair[0]) < shape_score(pair[1]), "{:?}", pair);
        }
        assert_eq!(shape_score(LineShape::Overline), 0);
    }
}
