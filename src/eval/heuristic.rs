//! Heuristic evaluation
//!
//! Two entry points:
//! - [`evaluate_position`] scores a single candidate square for move ordering
//!   and enforces mandatory defense.
//! - [`evaluate_board`] scores a whole position from the side to move's
//!   perspective for leaf nodes of the alpha-beta search.

use crate::board::{Board, Pos, Stone, TrialMove, DIRECTIONS};
use crate::rules::ForbiddenRule;
use crate::search::vcf::{VcfLimits, VcfSearcher};

use super::line::{five_points_through, MoveShape};
use super::options::EvalOptions;
use super::patterns::{shape_score, PatternScore};
use super::threats::{detect_opponent_threats, five_points, scan_points, ThreatReport};
use super::INFINITY;

/// Maximum Manhattan distance from center on 15x15 board
const MAX_CENTER_DIST: i32 = 14;

/// Weight per distance unit from center
const POSITION_WEIGHT: i32 = 3;

/// Share of the opponent's shape value credited for blocking it (numerator / 10)
const DEFENSE_WEIGHT: i32 = 9;

/// Node budget for the VCF probes behind fukumi and VCT bonuses
const PROBE_NODES: u64 = 400;

/// Budget of the VCF that lets a four override mandatory defense
const OVERRIDE_VCF_NODES: u64 = 5_000;
const OVERRIDE_VCF_DEPTH: usize = 16;

/// Scores candidate squares for one side on one board.
///
/// The opponent's threats are computed once on construction, so scoring many
/// squares of the same position stays cheap.
pub struct PositionEvaluator<'a> {
    board: &'a Board,
    color: Stone,
    options: &'a EvalOptions,
    rule: &'a dyn ForbiddenRule,
    threats: ThreatReport,
}

impl<'a> PositionEvaluator<'a> {
    pub fn new(
        board: &'a Board,
        color: Stone,
        options: &'a EvalOptions,
        rule: &'a dyn ForbiddenRule,
    ) -> Self {
        Self {
            board,
            color,
            options,
            rule,
            threats: detect_opponent_threats(board, color, rule),
        }
    }

    /// Score `color` playing `pos`.
    ///
    /// Returns [`PatternScore::FIVE`] for an immediate five and `-INFINITY`
    /// for an occupied or forbidden square, or for one that ignores a live
    /// opponent threat while mandatory defense is enabled.
    pub fn evaluate(&self, pos: Pos) -> i32 {
        let board = self.board;
        if !board.is_empty(pos) {
            return -INFINITY;
        }
        let color = self.color;
        let opp = color.opponent();

        let shape = MoveShape::analyze(board, pos, color, self.rule.exact_five(color));
        if shape.fives() > 0 {
            return PatternScore::FIVE;
        }
        if self.rule.is_forbidden(board, pos, color) {
            return -INFINITY;
        }
        if self.options.enable_mandatory_defense && self.violates_mandatory_defense(pos, &shape) {
            return -INFINITY;
        }

        let attack: i32 = shape.axes.iter().map(|&s| shape_score(s)).sum();
        let defense = if self.rule.is_forbidden(board, pos, opp) {
            // The opponent can never play here anyway
            0
        } else {
            let opp_shape = MoveShape::analyze(board, pos, opp, self.rule.exact_five(opp));
            opp_shape.axes.iter().map(|&s| shape_score(s)).sum::<i32>() * DEFENSE_WEIGHT / 10
        };

        attack + defense + center_bonus(pos) + self.tactical_bonus(pos, &shape)
    }

    /// Whether playing `pos` leaves a live opponent threat standing.
    fn violates_mandatory_defense(&self, pos: Pos, shape: &MoveShape) -> bool {
        let threats = &self.threats;

        // A four must be blocked on its completion square; nothing else helps
        if !threats.fours.is_empty() {
            return !threats.fours.contains(&pos);
        }

        if shape.open_fours() > 0 || shape.is_four_four() || shape.is_four_three() {
            return false;
        }
        if self.options.enable_counter_four && shape.fours() > 0 {
            return false;
        }

        let watch_mises = self.options.enable_mise_threat && !threats.mises.is_empty();
        if threats.open_threes.is_empty() && !watch_mises {
            return false;
        }

        let opp = self.color.opponent();
        let exact = self.rule.exact_five(opp);
        let mut scratch = self.board.clone();
        let after = scratch.trial(pos, self.color);

        let open_three_alive = threats.open_threes.iter().any(|&p| {
            p != pos
                && MoveShape::analyze(&after, p, opp, exact).open_fours() > 0
                && !self.rule.is_forbidden(&after, p, opp)
        });
        let mise_alive = watch_mises
            && threats.mises.iter().any(|&p| {
                p != pos
                    && MoveShape::analyze(&after, p, opp, exact).is_four_three()
                    && !self.rule.is_forbidden(&after, p, opp)
            });
        if !(open_three_alive || mise_alive) {
            return false;
        }

        // A four that keeps the initiative all the way to five needs no defense
        shape.fours() == 0 || !self.four_wins_by_vcf(after, pos)
    }

    /// Whether the four made at `pos` on `after` forces a win: its only
    /// block is forbidden for the opponent, or the VCF continues after it.
    fn four_wins_by_vcf(&self, mut after: TrialMove<'_>, pos: Pos) -> bool {
        let color = self.color;
        let opp = color.opponent();
        let blocks = five_points_through(&after, pos, color, self.rule.exact_five(color));
        let [block] = blocks[..] else {
            return blocks.len() > 1;
        };
        if self.rule.is_forbidden(&after, block, opp) {
            return true;
        }
        let reply = after.trial(block, opp);
        let limits = VcfLimits {
            time_limit: None,
            max_depth: OVERRIDE_VCF_DEPTH,
            node_limit: Some(OVERRIDE_VCF_NODES),
        };
        VcfSearcher::new(self.rule, limits)
            .find_vcf_move(&reply, color)
            .is_some()
    }

    fn tactical_bonus(&self, pos: Pos, shape: &MoveShape) -> i32 {
        let opts = self.options;
        let mut bonus = 0;

        if opts.enable_multi_threat {
            if shape.is_four_four() || shape.is_four_three() {
                bonus += PatternScore::OPEN_FOUR;
            } else if shape.open_threes() >= 2 {
                bonus += PatternScore::OPEN_THREE * 2;
            }
        }

        if opts.enable_single_four_penalty
            && shape.fours() == 1
            && shape.open_fours() == 0
            && shape.threes() == 0
        {
            bonus -= (opts.single_four_penalty_multiplier * f64::from(PatternScore::STOP_FOUR)) as i32;
        }

        if opts.enable_counter_four && shape.fours() > 0 && !self.threats.open_threes.is_empty() {
            bonus += PatternScore::OPEN_THREE;
        }

        let restricted = self.rule.restricted_color();
        let trap = opts.enable_forbidden_trap
            && shape.fours() > 0
            && restricted.is_some()
            && restricted != Some(self.color);
        let mise = opts.enable_mise && shape.fours() == 0 && shape.threes() > 0;
        let fukumi = opts.enable_fukumi && shape.fours() > 0;
        let vct = opts.enable_vct && shape.open_threes() > 0 && shape.fours() == 0;
        if !(trap || mise || fukumi || vct) {
            return bonus;
        }

        let color = self.color;
        let opp = color.opponent();
        let exact = self.rule.exact_five(color);
        let mut scratch = self.board.clone();
        let mut after = scratch.trial(pos, color);
        let blocks = five_points_through(&after, pos, color, exact);

        if trap && blocks.len() == 1 && self.rule.is_forbidden(&after, blocks[0], opp) {
            bonus += PatternScore::WINNING_THREAT;
        }

        if mise && self.leaves_four_three(&after, pos) {
            bonus += PatternScore::OPEN_THREE;
        }

        if fukumi && blocks.len() == 1 {
            let reply = after.trial(blocks[0], opp);
            if probe_vcf(&reply, color, self.rule) {
                bonus += PatternScore::OPEN_FOUR;
            }
        } else if vct {
            let defenses = scan_points(&after, color, self.rule).open_fours;
            let all_lose = !defenses.is_empty()
                && defenses.iter().all(|&d| {
                    let reply = after.trial(d, opp);
                    probe_vcf(&reply, color, self.rule)
                });
            if all_lose {
                bonus += PatternScore::OPEN_FOUR;
            }
        }

        bonus
    }

    /// After `pos` is played, does `color` have a legal four-three square on
    /// one of the lines through it?
    fn leaves_four_three(&self, after: &Board, pos: Pos) -> bool {
        let exact = self.rule.exact_five(self.color);
        DIRECTIONS.iter().any(|&(dr, dc)| {
            (-4..=4).filter_map(|k| pos.step(dr, dc, k)).any(|q| {
                after.is_empty(q)
                    && MoveShape::analyze(after, q, self.color, exact).is_four_three()
                    && !self.rule.is_forbidden(after, q, self.color)
            })
        })
    }
}

/// Small-budget VCF used by evaluation bonuses
fn probe_vcf(board: &Board, color: Stone, rule: &dyn ForbiddenRule) -> bool {
    let limits = VcfLimits {
        time_limit: None,
        max_depth: 8,
        node_limit: Some(PROBE_NODES),
    };
    VcfSearcher::new(rule, limits).find_vcf_move(board, color).is_some()
}

#[inline]
fn center_bonus(pos: Pos) -> i32 {
    (MAX_CENTER_DIST - pos.center_distance()) * POSITION_WEIGHT
}

/// Score `color` playing `pos`. See [`PositionEvaluator::evaluate`].
#[must_use]
pub fn evaluate_position(
    board: &Board,
    pos: Pos,
    color: Stone,
    options: &EvalOptions,
    rule: &dyn ForbiddenRule,
) -> i32 {
    PositionEvaluator::new(board, color, options, rule).evaluate(pos)
}

/// Evaluate the board from the perspective of `color`, the side to move.
///
/// Returns a score where:
/// - Positive values indicate advantage for `color`
/// - `PatternScore::FIVE` means `color` can complete five now
/// - `-PatternScore::FIVE` means the opponent's five cannot be stopped
#[must_use]
pub fn evaluate_board(
    board: &Board,
    color: Stone,
    options: &EvalOptions,
    rule: &dyn ForbiddenRule,
) -> i32 {
    let opponent = color.opponent();

    if !five_points(board, color, rule).is_empty() {
        return PatternScore::FIVE;
    }
    let opp_fives = five_points(board, opponent, rule);
    if opp_fives.len() >= 2 {
        return -PatternScore::FIVE;
    }
    if let [only] = opp_fives[..] {
        if rule.is_forbidden(board, only, color) {
            return -PatternScore::FIVE;
        }
    } else {
        let scan = scan_points(board, color, rule);
        if !scan.open_fours.is_empty() || !scan.four_fours.is_empty() {
            return PatternScore::WINNING_THREAT;
        }
    }

    let my_patterns = evaluate_patterns(board, color, options);
    let opp_patterns = evaluate_patterns(board, opponent, options);
    let position_score = evaluate_positions(board, color) - evaluate_positions(board, opponent);

    my_patterns - opp_patterns + position_score
}

/// Evaluate pattern-based score for a color.
///
/// Each line segment is counted once, from the stone that starts it.
/// With multi-threat enabled, combinations the opponent cannot block
/// together earn an extra open-four bonus.
fn evaluate_patterns(board: &Board, color: Stone, options: &EvalOptions) -> i32 {
    let Some(stones) = board.stones(color) else {
        return 0;
    };

    let mut score = 0;
    let mut open_fours = 0i32;
    let mut stop_fours = 0i32;
    let mut open_threes = 0i32;

    for pos in stones.iter_ones() {
        for &(dr, dc) in &DIRECTIONS {
            let pattern_score = evaluate_line(board, pos, dr, dc, color);
            score += pattern_score;

            if pattern_score >= PatternScore::OPEN_FOUR {
                open_fours += 1;
            } else if pattern_score >= PatternScore::STOP_FOUR {
                stop_fours += 1;
            } else if pattern_score >= PatternScore::OPEN_THREE {
                open_threes += 1;
            }
        }
    }

    if options.enable_multi_threat
        && (stop_fours >= 2 || (stop_fours >= 1 && open_threes >= 1) || open_fours >= 1)
    {
        score += PatternScore::OPEN_FOUR;
    }

    score
}

/// Score the segment starting at `pos` along `(dr, dc)`.
///
/// Returns 0 unless `pos` starts the segment (no `color` stone behind it).
/// Allows a single gap, so `OO_OO` and `O_OOO` read as fours.
fn evaluate_line(board: &Board, pos: Pos, dr: i32, dc: i32, color: Stone) -> i32 {
    let prev = pos.step(dr, dc, -1);
    if prev.is_some_and(|p| board.get(p) == color) {
        return 0;
    }

    let mut count = 1;
    let mut open_ends = 0;
    let mut has_gap = false;

    if prev.is_some_and(|p| board.is_empty(p)) {
        open_ends += 1;
    }

    let mut k = 1;
    while let Some(p) = pos.step(dr, dc, k) {
        match board.get(p) {
            s if s == color => {
                count += 1;
            }
            Stone::Empty if !has_gap => {
                if pos.step(dr, dc, k + 1).is_some_and(|n| board.get(n) == color) {
                    has_gap = true;
                    k += 1;
                    continue;
                }
                open_ends += 1;
                break;
            }
            Stone::Empty => {
                open_ends += 1;
                break;
            }
            _ => break,
        }
        k += 1;
    }

    if has_gap {
        match count {
            5.. => PatternScore::OPEN_FOUR,
            4 => PatternScore::STOP_FOUR,
            3 if open_ends == 2 => PatternScore::OPEN_THREE,
            3 if open_ends == 1 => PatternScore::CLOSED_THREE,
            _ => 0,
        }
    } else {
        match (count, open_ends) {
            (5.., _) => PatternScore::FIVE,
            (4, 2) => PatternScore::OPEN_FOUR,
            (4, 1) => PatternScore::STOP_FOUR,
            (3, 2) => PatternScore::OPEN_THREE,
            (3, 1) => PatternScore::CLOSED_THREE,
            (2, 2) => PatternScore::OPEN_TWO,
            (2, 1) => PatternScore::CLOSED_TWO,
            _ => 0,
        }
    }
}

/// Stones closer to the center are worth more.
fn evaluate_positions(board: &Board, color: Stone) -> i32 {
    board
        .stones(color)
        .map_or(0, |stones| stones.iter_ones().map(center_bonus).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Renju;

    fn setup_board(setup: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(row, col, stone) in setup {
            board.place_stone(Pos::new(row, col), stone);
        }
        board
    }

    fn open_four(color: Stone) -> Board {
        setup_board(&[(7, 3, color), (7, 4, color), (7, 5, color), (7, 6, color)])
    }

    #[test]
    fn test_evaluate_position_five_at_either_end() {
        let board = open_four(Stone::Black);
        let opts = EvalOptions::default();
        for pos in [Pos::new(7, 2), Pos::new(7, 7)] {
            let score = evaluate_position(&board, pos, Stone::Black, &opts, &Renju);
            assert!(score >= PatternScore::FIVE, "{pos}: {score}");
        }
    }

    #[test]
    fn test_mandatory_defense_against_open_four() {
        let board = open_four(Stone::White);
        let opts = EvalOptions::default();
        let eval = PositionEvaluator::new(&board, Stone::Black, &opts, &Renju);

        assert_eq!(eval.evaluate(Pos::new(0, 0)), -INFINITY);
        assert_eq!(eval.evaluate(Pos::new(8, 5)), -INFINITY);
        for pos in [Pos::new(7, 2), Pos::new(7, 7)] {
            let score = eval.evaluate(pos);
            assert!(score > -INFINITY && score < INFINITY, "{pos}: {score}");
        }
    }

    #[test]
    fn test_mandatory_defense_against_open_three() {
        let board = setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
        ]);
        let opts = EvalOptions::default();
        let eval = PositionEvaluator::new(&board, Stone::Black, &opts, &Renju);

        assert!(eval.evaluate(Pos::new(7, 4)) > -INFINITY);
        assert!(eval.evaluate(Pos::new(7, 8)) > -INFINITY);
        assert_eq!(eval.evaluate(Pos::new(7, 3)), -INFINITY);
        assert_eq!(eval.evaluate(Pos::new(2, 2)), -INFINITY);

        let relaxed = EvalOptions {
            enable_mandatory_defense: false,
            ..EvalOptions::default()
        };
        assert!(evaluate_position(&board, Pos::new(2, 2), Stone::Black, &relaxed, &Renju) > -INFINITY);
    }

    /// White stop four on row 7; Black has an open three on row 12
    fn stop_four_against_open_three() -> Board {
        setup_board(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (12, 2, Stone::Black),
            (12, 3, Stone::Black),
            (12, 4, Stone::Black),
        ])
    }

    #[test]
    fn test_four_starting_vcf_overrides_mandatory_defense() {
        let mut board = stop_four_against_open_three();
        for &(r, c, s) in &[
            (3, 3, Stone::Black),
            (4, 4, Stone::White),
            (5, 5, Stone::White),
            (6, 7, Stone::White),
            (6, 8, Stone::White),
            (6, 9, Stone::White),
            (6, 10, Stone::Black),
        ] {
            board.place_stone(Pos::new(r, c), s);
        }
        let opts = EvalOptions {
            enable_counter_four: false,
            ..EvalOptions::default()
        };
        let four = Pos::new(7, 7);

        // Black must block at (7,8); White keeps attacking with fours
        {
            let mut scratch = board.clone();
            let mut after = scratch.trial(four, Stone::White);
            let reply = after.trial(Pos::new(7, 8), Stone::Black);
            let limits = VcfLimits {
                time_limit: None,
                max_depth: OVERRIDE_VCF_DEPTH,
                node_limit: Some(OVERRIDE_VCF_NODES),
            };
            let line = VcfSearcher::new(&Renju, limits).find_vcf_move(&reply, Stone::White);
            assert!(line.is_some());
        }

        let score = evaluate_position(&board, four, Stone::White, &opts, &Renju);
        assert!(score > -INFINITY, "{score}");
    }

    #[test]
    fn test_lone_stop_four_still_must_defend() {
        let board = stop_four_against_open_three();
        let opts = EvalOptions {
            enable_counter_four: false,
            ..EvalOptions::default()
        };
        assert_eq!(
            evaluate_position(&board, Pos::new(7, 7), Stone::White, &opts, &Renju),
            -INFINITY
        );
        // Blocking the three stays legal
        assert!(evaluate_position(&board, Pos::new(12, 5), Stone::White, &opts, &Renju) > -INFINITY);
    }

    #[test]
    fn test_forbidden_square_scores_negative_infinity() {
        let board = setup_board(&[
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (5, 7, Stone::Black),
            (6, 7, Stone::Black),
        ]);
        let opts = EvalOptions::default();
        let score = evaluate_position(&board, Pos::new(7, 7), Stone::Black, &opts, &Renju);
        assert_eq!(score, -INFINITY);
        let score = evaluate_position(&board, Pos::new(7, 7), Stone::White, &opts, &Renju);
        assert!(score > 0);
    }

    #[test]
    fn test_occupied_square_scores_negative_infinity() {
        let board = setup_board(&[(7, 7, Stone::Black)]);
        let opts = EvalOptions::default();
        let score = evaluate_position(&board, Pos::new(7, 7), Stone::White, &opts, &Renju);
        assert_eq!(score, -INFINITY);
    }

    #[test]
    fn test_single_four_penalty() {
        let board = setup_board(&[
            (7, 2, Stone::White),
            (7, 3, Stone::Black),
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
        ]);
        let with_penalty = EvalOptions::default();
        let without = EvalOptions {
            enable_single_four_penalty: false,
            ..EvalOptions::default()
        };
        let pos = Pos::new(7, 6);
        let a = evaluate_position(&board, pos, Stone::Black, &with_penalty, &Renju);
        let b = evaluate_position(&board, pos, Stone::Black, &without, &Renju);
        assert_eq!(b - a, PatternScore::STOP_FOUR / 2);
    }

    #[test]
    fn test_evaluate_board_empty() {
        let board = Board::new();
        let opts = EvalOptions::default();
        assert_eq!(evaluate_board(&board, Stone::Black, &opts, &Renju), 0);
    }

    #[test]
    fn test_evaluate_board_winning_and_losing() {
        let board = open_four(Stone::Black);
        let opts = EvalOptions::default();
        assert_eq!(evaluate_board(&board, Stone::Black, &opts, &Renju), PatternScore::FIVE);
        assert_eq!(evaluate_board(&board, Stone::White, &opts, &Renju), -PatternScore::FIVE);
    }

    #[test]
    fn test_evaluate_board_negamax_symmetry() {
        let board = setup_board(&[
            (7, 7, Stone::Black),
            (7, 8, Stone::Black),
            (8, 8, Stone::White),
            (9, 9, Stone::White),
        ]);
        let opts = EvalOptions::default();
        let black = evaluate_board(&board, Stone::Black, &opts, &Renju);
        let white = evaluate_board(&board, Stone::White, &opts, &Renju);
        assert_eq!(black, -white);
    }

    #[test]
    fn test_evaluate_line_counts_gap_four() {
        let board = setup_board(&[
            (7, 3, Stone::White),
            (7, 4, Stone::White),
            (7, 6, Stone::White),
            (7, 7, Stone::White),
        ]);
        assert_eq!(evaluate_line(&board, Pos::new(7, 3), 0, 1, Stone::White), PatternScore::STOP_FOUR);
        assert_eq!(evaluate_line(&board, Pos::new(7, 4), 0, 1, Stone::White), 0);
    }
}
