//! Threat detection
//!
//! Scans every empty square that could matter for one color (within four
//! cells of one of its stones along an axis) and buckets it by what playing
//! there would make. Squares forbidden for the restricted color are dropped,
//! except fives, which always stand.

use serde::Serialize;

use crate::board::{Bitboard, Board, Pos, Stone, DIRECTIONS};
use crate::rules::ForbiddenRule;

use super::line::{completes_five, LineShape, MoveShape};

/// Squares `color` must watch, seen from the opponent's side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatReport {
    /// Squares that turn an opponent open three into a four: where it would
    /// make an open four, plus the run's other end when that only makes a
    /// stop four
    pub open_threes: Vec<Pos>,
    /// Where the opponent would complete five
    pub fours: Vec<Pos>,
    /// Where the opponent would make a four-three
    pub mises: Vec<Pos>,
}

/// Every tactically relevant square for one color, bucketed.
#[derive(Debug, Clone, Default)]
pub struct PointScan {
    pub fives: Vec<Pos>,
    pub open_fours: Vec<Pos>,
    /// Any four, open or not
    pub fours: Vec<Pos>,
    pub four_threes: Vec<Pos>,
    pub four_fours: Vec<Pos>,
    /// Threes (open or closed) that make no four
    pub threes: Vec<Pos>,
}

/// Empty squares within four cells of a `color` stone on some axis.
pub fn candidate_cells(board: &Board, color: Stone) -> Bitboard {
    let mut cells = Bitboard::new();
    let Some(stones) = board.stones(color) else {
        return cells;
    };
    for pos in stones.iter_ones() {
        for &(dr, dc) in &DIRECTIONS {
            for k in (-4..=4).filter(|&k| k != 0) {
                if let Some(p) = pos.step(dr, dc, k) {
                    if board.is_empty(p) {
                        cells.set(p);
                    }
                }
            }
        }
    }
    cells
}

/// Bucket every candidate square for `color`.
pub fn scan_points(board: &Board, color: Stone, rule: &dyn ForbiddenRule) -> PointScan {
    let exact = rule.exact_five(color);
    let restricted = rule.restricted_color() == Some(color);
    let mut scan = PointScan::default();

    for pos in candidate_cells(board, color).iter_ones() {
        let shape = MoveShape::analyze(board, pos, color, exact);
        if shape.fives() > 0 {
            scan.fives.push(pos);
            continue;
        }
        let fours = shape.fours();
        let threes = shape.threes();
        if fours == 0 && threes == 0 {
            continue;
        }
        if restricted && rule.check(board, pos, color).is_forbidden {
            continue;
        }
        if fours > 0 {
            scan.fours.push(pos);
            if shape.open_fours() > 0 {
                scan.open_fours.push(pos);
            }
            if shape.is_four_four() {
                scan.four_fours.push(pos);
            }
            if shape.is_four_three() {
                scan.four_threes.push(pos);
            }
        } else {
            scan.threes.push(pos);
        }
    }
    scan
}

/// Squares where `color` completes five.
pub fn five_points(board: &Board, color: Stone, rule: &dyn ForbiddenRule) -> Vec<Pos> {
    let exact = rule.exact_five(color);
    candidate_cells(board, color)
        .iter_ones()
        .filter(|&p| completes_five(board, p, color, exact))
        .collect()
}

/// Legal moves that make a four (but not a five) for `color`.
pub fn four_moves(board: &Board, color: Stone, rule: &dyn ForbiddenRule) -> Vec<Pos> {
    let exact = rule.exact_five(color);
    let restricted = rule.restricted_color() == Some(color);
    candidate_cells(board, color)
        .iter_ones()
        .filter(|&p| {
            let shape = MoveShape::analyze(board, p, color, exact);
            shape.fives() == 0
                && shape.fours() > 0
                && !(restricted && rule.check(board, p, color).is_forbidden)
        })
        .collect()
}

/// Threats `color` must answer: the opponent's open-three, five and
/// four-three squares. Each list is sorted and free of duplicates.
pub fn detect_opponent_threats(board: &Board, color: Stone, rule: &dyn ForbiddenRule) -> ThreatReport {
    let opp = color.opponent();
    let scan = scan_points(board, opp, rule);
    ThreatReport {
        open_threes: open_three_squares(board, opp, &scan.open_fours, rule),
        fours: scan.fives,
        mises: scan.four_threes,
    }
}

/// Every square adjacent to (or inside) a `color` open three that makes a
/// four on the three's axis. `open_fours` are the squares making an open four.
fn open_three_squares(
    board: &Board,
    color: Stone,
    open_fours: &[Pos],
    rule: &dyn ForbiddenRule,
) -> Vec<Pos> {
    let exact = rule.exact_five(color);
    let restricted = rule.restricted_color() == Some(color);
    let mut squares = Bitboard::new();

    for &p in open_fours {
        squares.set(p);
        let shape = MoveShape::analyze(board, p, color, exact);
        for (axis, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
            if shape.axes[axis] != LineShape::OpenFour {
                continue;
            }
            // Stones of the three lie next to p on either side
            let run = |sign: i32| {
                (1..=3)
                    .take_while(|&k| p.step(dr * sign, dc * sign, k).is_some_and(|q| board.get(q) == color))
                    .count() as i32
            };
            let (below, above) = (run(-1), run(1));
            let first = if below > 0 { -below } else { 1 };
            let last = if above > 0 { above } else { -1 };

            for k in (first - 1)..=(last + 1) {
                let Some(q) = p.step(dr, dc, k) else {
                    continue;
                };
                if squares.get(q) || !board.is_empty(q) {
                    continue;
                }
                let makes_four = MoveShape::analyze(board, q, color, exact).axes[axis].four_count() > 0;
                if makes_four && !(restricted && rule.check(board, q, color).is_forbidden) {
                    squares.set(q);
                }
            }
        }
    }
    squares.iter_ones().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Freestyle, Renju};

    fn setup_board(setup: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(row, col, stone) in setup {
            board.place_stone(Pos::new(row, col), stone);
        }
        board
    }

    #[test]
    fn test_detect_open_three() {
        let board = setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
        ]);
        let report = detect_opponent_threats(&board, Stone::Black, &Renju);
        assert_eq!(report.open_threes, vec![Pos::new(7, 4), Pos::new(7, 8)]);
        assert!(report.fours.is_empty());
    }

    #[test]
    fn test_open_three_reports_blocked_side_end() {
        // O . X X X . . : (7,4) only makes a stop four but still answers the three
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
        ]);
        let report = detect_opponent_threats(&board, Stone::Black, &Renju);
        assert_eq!(report.open_threes, vec![Pos::new(7, 4), Pos::new(7, 8)]);
    }

    #[test]
    fn test_split_three_reports_gap_and_ends() {
        // . X . X X . : the gap makes the open four, the outer ends make stop fours
        let board = setup_board(&[
            (7, 4, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
        ]);
        let report = detect_opponent_threats(&board, Stone::Black, &Renju);
        assert!(report.open_threes.contains(&Pos::new(7, 5)));
        assert!(report.open_threes.contains(&Pos::new(7, 3)));
        assert!(report.open_threes.contains(&Pos::new(7, 8)));
    }

    #[test]
    fn test_detect_stop_four_single_square() {
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
        ]);
        let report = detect_opponent_threats(&board, Stone::Black, &Renju);
        assert_eq!(report.fours, vec![Pos::new(7, 8)]);
    }

    #[test]
    fn test_four_at_edge_reports_in_bounds_square_only() {
        let board = setup_board(&[
            (0, 0, Stone::White),
            (0, 1, Stone::White),
            (0, 2, Stone::White),
            (0, 3, Stone::White),
        ]);
        let report = detect_opponent_threats(&board, Stone::Black, &Renju);
        assert_eq!(report.fours, vec![Pos::new(0, 4)]);
    }

    #[test]
    fn test_detect_mise() {
        // White plays (7,7): horizontal four plus vertical open three
        let board = setup_board(&[
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 3, Stone::Black),
            (5, 7, Stone::White),
            (6, 7, Stone::White),
        ]);
        let report = detect_opponent_threats(&board, Stone::Black, &Renju);
        assert!(report.mises.contains(&Pos::new(7, 7)));
    }

    #[test]
    fn test_forbidden_squares_dropped_for_black() {
        // (7,7) would be a double-three for Black
        let board = setup_board(&[
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (5, 7, Stone::Black),
            (6, 7, Stone::Black),
        ]);
        let renju = scan_points(&board, Stone::Black, &Renju);
        assert!(!renju.threes.contains(&Pos::new(7, 7)));
        let free = scan_points(&board, Stone::Black, &Freestyle);
        assert!(free.threes.contains(&Pos::new(7, 7)));
    }

    #[test]
    fn test_four_moves_and_five_points() {
        let board = setup_board(&[
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (7, 7, Stone::Black),
        ]);
        let fours = four_moves(&board, Stone::Black, &Renju);
        assert!(fours.contains(&Pos::new(7, 4)));
        assert!(fours.contains(&Pos::new(7, 8)));
        assert!(five_points(&board, Stone::Black, &Renju).is_empty());
    }
}
