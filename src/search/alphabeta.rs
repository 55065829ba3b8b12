//! Alpha-Beta search with iterative deepening and transposition table
//!
//! Negamax with alpha-beta pruning. Before deepening, the root checks for an
//! immediate five and runs a bounded VCF search; a proven forced win skips
//! the tree search entirely.
//!
//! # Example
//!
//! ```
//! use renju::board::{Board, Pos, Stone};
//! use renju::eval::EvalOptions;
//! use renju::rules::RuleKind;
//! use renju::search::Searcher;
//!
//! let mut searcher = Searcher::new(RuleKind::Renju.build(), EvalOptions::default(), 1 << 16);
//! let result = searcher.find_best_move(&Board::new(), Stone::Black, 2, 0.0).unwrap();
//! assert_eq!(result.position, Pos::new(7, 7));
//! ```

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{Board, Pos, Stone};
use crate::error::EngineError;
use crate::eval::{evaluate_board, five_points, EvalOptions, PatternScore, INFINITY};
use crate::rules::{check_winner, ForbiddenRule, RuleKind};

use super::movegen::{generate_scored_moves, generate_sorted_moves, MoveContext};
use super::vcf::{VcfLimits, VcfSearcher};
use super::{EntryType, TTStats, TranspositionTable, ZobristTable};

/// Score of a won position, reduced by the ply it is reached at
const WIN: i32 = 5_000_000;

/// Scores beyond this are forced wins (or losses, negated)
const WIN_THRESHOLD: i32 = WIN - 1000;

/// Maximum moves to consider at root
const MAX_ROOT_MOVES: usize = 20;

/// Maximum moves to consider at internal nodes
const MAX_INTERNAL_MOVES: usize = 12;

/// Node budget of the root VCF pre-check; a node count keeps it deterministic
const ROOT_VCF_NODES: u64 = 5_000;

/// Depth of the root VCF pre-check (attacker fours)
const ROOT_VCF_DEPTH: usize = 16;

/// Deadline is polled once per this many nodes
const TIME_CHECK_INTERVAL: u64 = 256;

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Alpha-beta nodes visited
    pub nodes: u64,
    /// Static evaluations (leaf scores and move-ordering scores)
    pub evaluation_calls: u64,
    pub tt_probes: u64,
    /// Probes that found an entry
    pub tt_hits: u64,
    /// Probes whose score ended the node
    pub tt_cutoffs: u64,
    pub beta_cutoffs: u64,
    /// Attacker nodes spent in the root VCF pre-check
    pub vcf_nodes: u64,
}

/// Outcome of one search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Move to play
    pub position: Pos,
    /// Score for the side to move; `±INFINITY` marks a proven win or loss
    pub score: i32,
    /// Deepest fully searched depth (0 when none completed)
    pub completed_depth: u32,
    /// Whether the time or node budget cut the search short
    pub interrupted: bool,
    pub stats: SearchStats,
}

/// Budget for [`Searcher::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    pub max_depth: u32,
    /// Wall-clock budget; `None` searches every depth to the end
    pub time_limit_ms: Option<u64>,
    pub node_limit: Option<u64>,
    /// Root move jitter in `[0, 1]`
    pub randomness: f64,
}

impl SearchLimits {
    /// Fixed depth, no time or node budget, deterministic.
    pub fn depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            time_limit_ms: None,
            node_limit: None,
            randomness: 0.0,
        }
    }
}

/// Iterative deepening progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeepeningState {
    Idle,
    Deepening(u32),
    /// Budget hit; the unfinished depth is discarded
    Interrupted,
    /// Reached the depth limit or a proven result
    Exhausted,
}

/// Completed root search at one depth
struct RootOutcome {
    best: Pos,
    score: i32,
    /// Every searched root move with its score (bounds for pruned ones)
    scored: Vec<(Pos, i32)>,
}

/// Moves available at one node
enum NodeMoves {
    Moves(Vec<Pos>),
    /// The opponent completes five whatever we do
    Lost,
    /// Nothing legal to play
    None,
}

/// Single-threaded alpha-beta searcher.
///
/// Owns its transposition table; separate searchers share nothing and may
/// run on separate threads.
pub struct Searcher {
    tt: TranspositionTable,
    zobrist: ZobristTable,
    rule: Box<dyn ForbiddenRule>,
    options: EvalOptions,
    rng: SmallRng,
    stats: SearchStats,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    stopped: bool,
}

impl Searcher {
    /// Create a searcher whose table holds up to `tt_max_entries` entries.
    #[must_use]
    pub fn new(rule: Box<dyn ForbiddenRule>, options: EvalOptions, tt_max_entries: usize) -> Self {
        Self {
            tt: TranspositionTable::new(tt_max_entries),
            zobrist: ZobristTable::new(),
            rule,
            options,
            rng: SmallRng::from_entropy(),
            stats: SearchStats::default(),
            deadline: None,
            node_limit: None,
            stopped: false,
        }
    }

    /// Fix the seed used for randomised move choice.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    #[inline]
    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    #[inline]
    pub fn rule(&self) -> &dyn ForbiddenRule {
        &*self.rule
    }

    /// Search to `max_depth` without a time limit.
    ///
    /// `randomness` in `[0, 1]` picks among root moves scoring within a margin
    /// of the best; 0 is fully deterministic. Starts from an empty table.
    pub fn find_best_move(
        &mut self,
        board: &Board,
        color: Stone,
        max_depth: u32,
        randomness: f64,
    ) -> Result<SearchResult, EngineError> {
        self.tt.clear();
        self.run(board, color, max_depth, None, None, randomness)
    }

    /// Iterative deepening bounded by `time_limit_ms`. Starts from an empty table.
    pub fn find_best_move_iterative(
        &mut self,
        board: &Board,
        color: Stone,
        max_depth: u32,
        time_limit_ms: u64,
    ) -> Result<SearchResult, EngineError> {
        self.tt.clear();
        let deadline = Instant::now() + Duration::from_millis(time_limit_ms);
        self.run(board, color, max_depth, Some(deadline), None, 0.0)
    }

    /// Iterative deepening that keeps the table from earlier calls (aged by
    /// one generation) and optionally stops after `node_limit` nodes.
    pub fn find_best_move_iterative_with_tt(
        &mut self,
        board: &Board,
        color: Stone,
        max_depth: u32,
        time_limit_ms: u64,
        node_limit: Option<u64>,
    ) -> Result<SearchResult, EngineError> {
        self.tt.new_generation();
        let deadline = Instant::now() + Duration::from_millis(time_limit_ms);
        self.run(board, color, max_depth, Some(deadline), node_limit, 0.0)
    }

    /// Search with every limit explicit, keeping the table from earlier
    /// calls (aged by one generation).
    pub fn search(
        &mut self,
        board: &Board,
        color: Stone,
        limits: &SearchLimits,
    ) -> Result<SearchResult, EngineError> {
        self.tt.new_generation();
        let deadline = limits
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        self.run(
            board,
            color,
            limits.max_depth,
            deadline,
            limits.node_limit,
            limits.randomness,
        )
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    fn run(
        &mut self,
        board: &Board,
        color: Stone,
        max_depth: u32,
        deadline: Option<Instant>,
        node_limit: Option<u64>,
        randomness: f64,
    ) -> Result<SearchResult, EngineError> {
        if color == Stone::Empty {
            return Err(EngineError::InvalidInput(
                "side to move must be black or white".to_string(),
            ));
        }
        if let Some(winner) = check_winner(board, &*self.rule) {
            return Err(EngineError::InvalidInput(format!(
                "game is already over: {} has five",
                winner
            )));
        }
        self.stats = SearchStats::default();
        self.deadline = deadline;
        self.node_limit = node_limit;
        self.stopped = false;

        let mut work = board.clone();
        if let Some(&five) = five_points(&work, color, &*self.rule).first() {
            log::info!("{} completes five at {}", color, five);
            return Ok(self.proven(five, INFINITY));
        }

        let root_moves = match self.node_moves(&work, color, None, MAX_ROOT_MOVES) {
            NodeMoves::Moves(moves) => moves,
            NodeMoves::Lost => {
                // Any legal square will do
                let ctx = MoveContext {
                    tt_move: None,
                    use_static_eval: false,
                    options: &self.options,
                    rule: &*self.rule,
                };
                let Some(&position) = generate_sorted_moves(&work, color, &ctx).first() else {
                    return Err(EngineError::NoLegalMoves);
                };
                return Ok(self.proven(position, -INFINITY));
            }
            NodeMoves::None => return Err(EngineError::NoLegalMoves),
        };

        if five_points(&work, color.opponent(), &*self.rule).is_empty() {
            let limits = VcfLimits {
                time_limit: None,
                max_depth: ROOT_VCF_DEPTH,
                node_limit: Some(ROOT_VCF_NODES),
            };
            let mut vcf = VcfSearcher::new(&*self.rule, limits);
            let found = vcf.find_vcf_move(&work, color);
            self.stats.vcf_nodes = vcf.nodes();
            if let Some(pos) = found {
                log::info!("{} has a VCF starting at {}", color, pos);
                return Ok(self.proven(pos, INFINITY));
            }
        }

        let margin = (randomness.clamp(0.0, 1.0) * f64::from(2 * PatternScore::OPEN_THREE)) as i32;
        let mut state = DeepeningState::Idle;
        let mut best: Option<RootOutcome> = None;
        let mut completed = 0;
        let mut moves = root_moves;

        for depth in 1..=max_depth.max(1) {
            if self.deadline_passed() {
                self.stopped = true;
            }
            if self.stopped {
                state = DeepeningState::Interrupted;
                break;
            }
            state = DeepeningState::Deepening(depth);

            let outcome = self.search_root(&mut work, color, depth, &moves, margin);
            if self.stopped {
                if let DeepeningState::Deepening(d) = state {
                    log::debug!("depth {} interrupted after {} nodes", d, self.stats.nodes);
                }
                state = DeepeningState::Interrupted;
                break;
            }
            let Some(outcome) = outcome else {
                break;
            };

            log::debug!(
                "depth {}: best {} score {} nodes {}",
                depth,
                outcome.best,
                outcome.score,
                self.stats.nodes
            );
            completed = depth;

            // Principal move first for the next iteration
            if let Some(idx) = moves.iter().position(|&m| m == outcome.best) {
                moves[..=idx].rotate_right(1);
            }
            let proven = outcome.score.abs() > WIN_THRESHOLD;
            best = Some(outcome);
            if proven {
                break;
            }
        }
        if state != DeepeningState::Interrupted {
            state = DeepeningState::Exhausted;
        }
        let interrupted = state == DeepeningState::Interrupted;

        let Some(outcome) = best else {
            let position = moves[0];
            log::warn!("no depth completed; falling back to ordering move {}", position);
            let score = {
                let child = work.trial(position, color);
                self.stats.evaluation_calls += 1;
                -evaluate_board(&child, color.opponent(), &self.options, &*self.rule)
            };
            return Ok(SearchResult {
                position,
                score,
                completed_depth: 0,
                interrupted: true,
                stats: self.stats,
            });
        };

        let (position, score) = self.choose(&outcome, margin);
        Ok(SearchResult {
            position,
            score: reported(score),
            completed_depth: completed,
            interrupted,
            stats: self.stats,
        })
    }

    /// Result for a shortcut that needs no tree search
    fn proven(&self, position: Pos, score: i32) -> SearchResult {
        SearchResult {
            position,
            score,
            completed_depth: 1,
            interrupted: false,
            stats: self.stats,
        }
    }

    /// Pick the root move, optionally at random among near-best moves.
    ///
    /// A proven win is always kept, and a proven loss is never chosen while
    /// anything else is available.
    fn choose(&mut self, outcome: &RootOutcome, margin: i32) -> (Pos, i32) {
        if margin == 0 || outcome.score > WIN_THRESHOLD {
            return (outcome.best, outcome.score);
        }
        let pool: Vec<(Pos, i32)> = outcome
            .scored
            .iter()
            .copied()
            .filter(|&(_, s)| s >= outcome.score - margin && s >= -WIN_THRESHOLD)
            .collect();
        if pool.is_empty() {
            return (outcome.best, outcome.score);
        }
        pool[self.rng.gen_range(0..pool.len())]
    }

    fn search_root(
        &mut self,
        board: &mut Board,
        color: Stone,
        depth: u32,
        moves: &[Pos],
        margin: i32,
    ) -> Option<RootOutcome> {
        let depth = depth as i32;
        let hash = self.zobrist.hash(board, color);
        let opp = color.opponent();
        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best: Option<(Pos, i32)> = None;
        let mut scored = Vec::with_capacity(moves.len());

        for &m in moves {
            let child_hash = self.zobrist.update_place(hash, m, color);
            let score = {
                let mut child = board.trial(m, color);
                -self.alpha_beta(&mut child, opp, depth - 1, 1, -beta, -alpha, child_hash)
            };
            if self.stopped {
                return None;
            }
            scored.push((m, score));
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((m, score));
                // Moves within the margin still need exact scores to choose between
                alpha = alpha.max(score - margin);
            }
        }

        let (best_move, score) = best?;
        self.tt.store(hash, score, depth, EntryType::Exact, Some(best_move));
        Some(RootOutcome {
            best: best_move,
            score,
            scored,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &mut Board,
        color: Stone,
        depth: i32,
        ply: i32,
        mut alpha: i32,
        mut beta: i32,
        hash: u64,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.stats.nodes += 1;

        let opp = color.opponent();
        if !five_points(board, color, &*self.rule).is_empty() {
            return WIN - (ply + 1);
        }
        if five_points(board, opp, &*self.rule).len() >= 2 {
            return -(WIN - (ply + 2));
        }
        if board.is_full() {
            return 0;
        }
        if depth <= 0 {
            self.stats.evaluation_calls += 1;
            return evaluate_board(board, color, &self.options, &*self.rule);
        }

        let alpha_orig = alpha;
        let mut tt_move = None;
        self.stats.tt_probes += 1;
        if let Some(entry) = self.tt.probe(hash) {
            self.stats.tt_hits += 1;
            tt_move = entry.best_move;
            if entry.depth >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.entry_type {
                    EntryType::Exact => {
                        self.stats.tt_cutoffs += 1;
                        return score;
                    }
                    EntryType::LowerBound => alpha = alpha.max(score),
                    EntryType::UpperBound => beta = beta.min(score),
                }
                if alpha >= beta {
                    self.stats.tt_cutoffs += 1;
                    return score;
                }
            }
        }

        let moves = match self.node_moves(board, color, tt_move, MAX_INTERNAL_MOVES) {
            NodeMoves::Moves(moves) => moves,
            NodeMoves::Lost => return -(WIN - (ply + 2)),
            NodeMoves::None => return 0,
        };

        let mut best_score = -INFINITY;
        let mut best_move = None;
        for m in moves {
            let child_hash = self.zobrist.update_place(hash, m, color);
            let score = {
                let mut child = board.trial(m, color);
                -self.alpha_beta(&mut child, opp, depth - 1, ply + 1, -beta, -alpha, child_hash)
            };
            if self.stopped {
                return 0;
            }
            if score > best_score {
                best_score = score;
                best_move = Some(m);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                break;
            }
        }

        let entry_type = if best_score <= alpha_orig {
            EntryType::UpperBound
        } else if best_score >= beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        self.tt
            .store(hash, score_to_tt(best_score, ply), depth, entry_type, best_move);
        best_score
    }

    /// Moves to search at a node, capped at `width`.
    ///
    /// A single opponent five point must be blocked; moves the evaluator
    /// rules out are dropped unless nothing else is left.
    fn node_moves(
        &mut self,
        board: &Board,
        color: Stone,
        tt_move: Option<Pos>,
        width: usize,
    ) -> NodeMoves {
        let opp_fives = five_points(board, color.opponent(), &*self.rule);
        match opp_fives.as_slice() {
            [] => {}
            [block] => {
                if self.rule.is_forbidden(board, *block, color) {
                    log::trace!("{} cannot block {} (forbidden)", color, block);
                    return NodeMoves::Lost;
                }
                return NodeMoves::Moves(vec![*block]);
            }
            _ => return NodeMoves::Lost,
        }

        let ctx = MoveContext {
            tt_move,
            use_static_eval: true,
            options: &self.options,
            rule: &*self.rule,
        };
        let scored = generate_scored_moves(board, color, &ctx);
        self.stats.evaluation_calls += scored.len() as u64;
        if scored.is_empty() {
            return NodeMoves::None;
        }

        let any_playable = scored.iter().any(|&(_, s)| s > -INFINITY);
        let moves = scored
            .into_iter()
            .filter(|&(_, s)| !any_playable || s > -INFINITY)
            .map(|(p, _)| p)
            .take(width)
            .collect();
        NodeMoves::Moves(moves)
    }

    /// Node limit is checked before each node; the clock every few hundred.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.node_limit.is_some_and(|n| self.stats.nodes >= n) {
            self.stopped = true;
        } else if self.stats.nodes % TIME_CHECK_INTERVAL == 0 && self.deadline_passed() {
            self.stopped = true;
        }
        self.stopped
    }

    #[inline]
    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(RuleKind::default().build(), EvalOptions::default(), 1 << 20)
    }
}

/// Map internal win scores to `±INFINITY`
fn reported(score: i32) -> i32 {
    if score > WIN_THRESHOLD {
        INFINITY
    } else if score < -WIN_THRESHOLD {
        -INFINITY
    } else {
        score
    }
}

/// Win scores are stored relative to the node, not the root
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score > WIN_THRESHOLD {
        score + ply
    } else if score < -WIN_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score > WIN_THRESHOLD {
        score - ply
    } else if score < -WIN_THRESHOLD {
        score + ply
    } else {
        score
    }
}
