//! Mise-VCF search
//!
//! A mise is a quiet move (a three, never a four) that leaves the opponent
//! a single sensible reply, after which a VCF wins. The search is sound
//! rather than complete: a candidate is reported only when every plausible
//! reply still loses to VCF.

use serde::Serialize;

use crate::board::{Bitboard, Board, Pos, Stone, DIRECTIONS};
use crate::eval::{four_moves, scan_points};
use crate::rules::ForbiddenRule;

use super::vcf::{VcfLimits, VcfSearcher};

/// A proven Mise-VCF line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiseVcfSequence {
    /// The quiet setup move
    pub first_move: Pos,
    /// The opponent's expected reply
    pub defense_move: Pos,
    /// First move of the VCF that follows the reply
    pub mise_move: Pos,
    /// `first_move`, `defense_move`, then the VCF line
    pub sequence: Vec<Pos>,
}

/// First move of a Mise-VCF win for `color`, if one is found within `limits`.
pub fn find_mise_vcf_move(
    board: &Board,
    color: Stone,
    rule: &dyn ForbiddenRule,
    limits: VcfLimits,
) -> Option<Pos> {
    find_mise_vcf_sequence(board, color, rule, limits).map(|s| s.first_move)
}

/// Full Mise-VCF line for `color`. The board is not modified.
pub fn find_mise_vcf_sequence(
    board: &Board,
    color: Stone,
    rule: &dyn ForbiddenRule,
    limits: VcfLimits,
) -> Option<MiseVcfSequence> {
    let mut vcf = VcfSearcher::new(rule, limits);
    search_with(&mut vcf, board, color, rule)
}

/// Mise-VCF search that draws on an existing searcher's budget and memo.
pub fn search_with(
    vcf: &mut VcfSearcher<'_>,
    board: &Board,
    color: Stone,
    rule: &dyn ForbiddenRule,
) -> Option<MiseVcfSequence> {
    if color == Stone::Empty {
        return None;
    }
    let opp = color.opponent();

    // A live opponent three or four outranks any quiet move of ours
    let opp_scan = scan_points(board, opp, rule);
    if !opp_scan.fives.is_empty() || !opp_scan.open_fours.is_empty() {
        return None;
    }

    let candidates = scan_points(board, color, rule).threes;
    let mut work = board.clone();
    for m in candidates {
        if vcf.budget_exhausted() {
            log::debug!("mise: budget exhausted after {} nodes", vcf.nodes());
            break;
        }
        let after = work.trial(m, color);
        let Some(defenses) = plausible_defenses(vcf, &after, m, color, rule) else {
            log::trace!("mise: {} forces nothing", m);
            continue;
        };
        let Some(result) = refute_all(vcf, &after, m, &defenses, color) else {
            continue;
        };
        return Some(result);
    }
    None
}

/// Opponent replies worth checking after `m`, or `None` when `m` threatens
/// nothing that the opponent has to answer.
fn plausible_defenses(
    vcf: &mut VcfSearcher<'_>,
    after: &Board,
    m: Pos,
    color: Stone,
    rule: &dyn ForbiddenRule,
) -> Option<Vec<Pos>> {
    let scan = scan_points(after, color, rule);
    let mut threats: Vec<Pos> = scan
        .open_fours
        .iter()
        .chain(&scan.four_threes)
        .chain(&scan.four_fours)
        .copied()
        .collect();
    let pass_line = vcf.find_vcf_sequence(after, color).unwrap_or_default();
    if threats.is_empty() && pass_line.is_empty() {
        return None;
    }
    threats.extend(pass_line.iter().copied());

    let mut squares = Bitboard::new();
    for &p in threats.iter().chain(std::iter::once(&m)) {
        squares.set(p);
        for &(dr, dc) in &DIRECTIONS {
            for k in -4..=4 {
                if let Some(q) = p.step(dr, dc, k) {
                    squares.set(q);
                }
            }
        }
    }
    let opp = color.opponent();
    for p in four_moves(after, opp, rule) {
        squares.set(p);
    }

    let defenses: Vec<Pos> = squares
        .difference(&after.occupied())
        .iter_ones()
        .filter(|&d| !rule.is_forbidden(after, d, opp))
        .collect();
    if defenses.is_empty() {
        None
    } else {
        Some(defenses)
    }
}

/// Check that every defense loses to VCF; build the line for the first one.
fn refute_all(
    vcf: &mut VcfSearcher<'_>,
    after: &Board,
    m: Pos,
    defenses: &[Pos],
    color: Stone,
) -> Option<MiseVcfSequence> {
    let opp = color.opponent();
    let mut scratch = after.clone();
    let mut expected: Option<(Pos, Vec<Pos>)> = None;
    for &d in defenses {
        let reply = scratch.trial(d, opp);
        match vcf.find_vcf_sequence(&reply, color) {
            Some(line) => {
                if expected.is_none() {
                    expected = Some((d, line));
                }
            }
            None => {
                if vcf.is_aborted() {
                    log::debug!("mise: {} undecided, budget ran out", m);
                } else {
                    log::trace!("mise: {} escapes {} with {}", opp, m, d);
                }
                return None;
            }
        }
    }

    let (defense_move, line) = expected?;
    let mise_move = *line.first()?;
    let mut sequence = Vec::with_capacity(line.len() + 2);
    sequence.push(m);
    sequence.push(defense_move);
    sequence.extend(line);
    Some(MiseVcfSequence {
        first_move: m,
        defense_move,
        mise_move,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MoveShape;
    use crate::rules::Renju;

    fn setup_board(setup: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(r, c, s) in setup {
            board.place_stone(Pos::new(r, c), s);
        }
        board
    }

    fn limits() -> VcfLimits {
        VcfLimits {
            time_limit: None,
            max_depth: 12,
            node_limit: Some(500_000),
        }
    }

    /// Two White twos meeting at (7,7): playing there makes a double three
    fn cross_position() -> Board {
        setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (5, 7, Stone::White),
            (6, 7, Stone::White),
            (0, 0, Stone::Black),
            (14, 14, Stone::Black),
            (0, 14, Stone::Black),
            (14, 0, Stone::Black),
        ])
    }

    #[test]
    fn test_mise_found_is_sound() {
        let board = cross_position();
        let before = board.clone();
        let mise = find_mise_vcf_sequence(&board, Stone::White, &Renju, limits()).unwrap();
        assert_eq!(board, before);

        let shape = MoveShape::analyze(&board, mise.first_move, Stone::White, false);
        assert!(shape.threes() > 0);
        assert_eq!(shape.fours(), 0);

        assert_eq!(mise.sequence[0], mise.first_move);
        assert_eq!(mise.sequence[1], mise.defense_move);
        assert_eq!(mise.sequence[2], mise.mise_move);

        let mut after = board.clone();
        after.place_stone(mise.first_move, Stone::White);
        after.place_stone(mise.defense_move, Stone::Black);
        let mut vcf = VcfSearcher::new(&Renju, limits());
        assert!(vcf.find_vcf_move(&after, Stone::White).is_some());
    }

    #[test]
    fn test_mise_rejects_noriki_escape() {
        // A lone open three can simply be blocked
        let board = setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (0, 0, Stone::Black),
            (14, 14, Stone::Black),
        ]);
        let found = find_mise_vcf_move(&board, Stone::White, &Renju, limits());
        assert_ne!(found, Some(Pos::new(7, 7)));
        assert_eq!(found, None);
    }

    /// White (7,7) makes an open three on row 7. Blocking at (7,8) loses to
    /// (7,4), a four-three with column 4; blocking at (7,4) escapes.
    fn one_sided_three() -> Board {
        setup_board(&[
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (5, 4, Stone::White),
            (6, 4, Stone::White),
            (0, 0, Stone::Black),
            (14, 14, Stone::Black),
        ])
    }

    #[test]
    fn test_mise_rejects_three_with_one_escaping_block() {
        let board = one_sided_three();
        let m = Pos::new(7, 7);
        let mut work = board.clone();
        let mut after = work.trial(m, Stone::White);

        let defenses = {
            let mut vcf = VcfSearcher::new(&Renju, limits());
            plausible_defenses(&mut vcf, &after, m, Stone::White, &Renju).unwrap()
        };
        let losing = Pos::new(7, 8);
        let escaping = Pos::new(7, 4);
        assert!(defenses.contains(&losing));
        assert!(defenses.contains(&escaping));

        {
            let reply = after.trial(losing, Stone::Black);
            let line = VcfSearcher::new(&Renju, limits()).find_vcf_sequence(&reply, Stone::White);
            assert!(line.is_some_and(|l| l.contains(&Pos::new(7, 4))));
        }
        {
            let reply = after.trial(escaping, Stone::Black);
            let mut vcf = VcfSearcher::new(&Renju, limits());
            assert_eq!(vcf.find_vcf_sequence(&reply, Stone::White), None);
            assert!(!vcf.is_aborted());
        }
        drop(after);

        let mut vcf = VcfSearcher::new(&Renju, limits());
        let after = work.trial(m, Stone::White);
        assert_eq!(refute_all(&mut vcf, &after, m, &[losing, escaping], Stone::White), None);
        drop(after);

        assert_ne!(
            find_mise_vcf_move(&board, Stone::White, &Renju, limits()),
            Some(m)
        );
    }

    #[test]
    fn test_mise_never_returns_quiet_square() {
        let board = setup_board(&[
            (7, 7, Stone::White),
            (3, 11, Stone::White),
            (0, 0, Stone::Black),
        ]);
        assert_eq!(find_mise_vcf_move(&board, Stone::White, &Renju, limits()), None);
    }

    #[test]
    fn test_mise_yields_to_opponent_open_three() {
        let mut board = cross_position();
        for c in 5..8 {
            board.place_stone(Pos::new(11, c), Stone::Black);
        }
        assert_eq!(find_mise_vcf_move(&board, Stone::White, &Renju, limits()), None);
    }
}
