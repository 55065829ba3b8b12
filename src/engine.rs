//! Main engine integrating all search components
//!
//! The engine tries cheap, certain answers before expensive ones:
//!
//! 1. **Immediate win**: complete five
//! 2. **Defense**: block the opponent's five point
//! 3. **VCF**: forced win by continuous fours
//! 4. **Mise-VCF**: a quiet move that forces a reply, then VCF
//! 5. **Alpha-Beta**: iterative deepening with transposition table
//!
//! # Example
//!
//! ```
//! use renju::{Board, Engine, EngineConfig, Pos, Stone};
//!
//! let config = EngineConfig { max_depth: 2, ..EngineConfig::default() };
//! let mut engine = Engine::new(config).unwrap();
//!
//! let mut board = Board::new();
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//!
//! let result = engine.get_move(&board, Stone::White).unwrap();
//! println!("{} via {:?} in {}ms", result.best_move, result.search_type, result.time_ms);
//! ```

use std::time::Instant;

use serde::Serialize;

use crate::board::{Board, Pos, Stone};
use crate::config::EngineConfig;
use crate::error::{EngineError, ProtocolError};
use crate::eval::{evaluate_position, five_points, INFINITY};
use crate::protocol::{format_move, parse_moves, side_to_move, EvalRequest, EvalResponse};
use crate::rules::{check_winner, ForbiddenRule};
use crate::search::mise::find_mise_vcf_sequence;
use crate::search::{SearchLimits, SearchResult, Searcher, TTStats, VcfLimits, VcfSearcher};

/// Which stage of the ladder produced the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchType {
    /// Completes five
    ImmediateWin,
    /// Blocks the opponent's five point
    Defense,
    /// Starts a forced win by continuous fours
    Vcf,
    /// Starts a Mise-VCF forced win
    MiseVcf,
    /// Regular alpha-beta search result
    AlphaBeta,
}

impl SearchType {
    /// Whether the move starts a proven win
    pub fn is_forced_win(self) -> bool {
        matches!(self, SearchType::ImmediateWin | SearchType::Vcf | SearchType::MiseVcf)
    }
}

/// Result of a move search with search metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub best_move: Pos,
    /// Score for the side to move; `±INFINITY` marks a proven win or loss
    pub score: i32,
    pub search_type: SearchType,
    pub time_ms: u64,
    /// Alpha-beta or VCF nodes spent
    pub nodes: u64,
    /// Forced line starting with `best_move`, empty for ordinary moves
    pub sequence: Vec<Pos>,
    pub completed_depth: u32,
    pub interrupted: bool,
}

impl MoveResult {
    #[inline]
    fn forced(search_type: SearchType, sequence: Vec<Pos>, nodes: u64, start: Instant) -> Option<Self> {
        let best_move = *sequence.first()?;
        Some(Self {
            best_move,
            score: INFINITY,
            search_type,
            time_ms: elapsed_ms(start),
            nodes,
            sequence,
            completed_depth: 0,
            interrupted: false,
        })
    }

    #[inline]
    fn defense(pos: Pos, score: i32, start: Instant) -> Self {
        Self {
            best_move: pos,
            score,
            search_type: SearchType::Defense,
            time_ms: elapsed_ms(start),
            nodes: 0,
            sequence: Vec::new(),
            completed_depth: 0,
            interrupted: false,
        }
    }

    #[inline]
    fn from_alphabeta(result: SearchResult, start: Instant) -> Self {
        Self {
            best_move: result.position,
            score: result.score,
            search_type: SearchType::AlphaBeta,
            time_ms: elapsed_ms(start),
            nodes: result.stats.nodes,
            sequence: Vec::new(),
            completed_depth: result.completed_depth,
            interrupted: result.interrupted,
        }
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Move-search engine for one game context.
///
/// Owns its searcher and transposition table. Engines share no state, so
/// independent positions can be evaluated on separate threads with one
/// engine each.
pub struct Engine {
    config: EngineConfig,
    rule: Box<dyn ForbiddenRule>,
    searcher: Searcher,
}

impl Engine {
    /// Create an engine; the configuration is validated first.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let searcher = Searcher::new(config.rule.build(), config.eval, config.tt_max_entries);
        Ok(Self {
            rule: config.rule.build(),
            searcher,
            config,
        })
    }

    /// Fix the seed used when `randomness` is non-zero.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.searcher = self.searcher.with_seed(seed);
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Best move for `color` on `board`, trying each stage of the ladder in turn.
    pub fn get_move(&mut self, board: &Board, color: Stone) -> Result<MoveResult, EngineError> {
        if color == Stone::Empty {
            return Err(EngineError::InvalidInput(
                "side to move must be black or white".to_string(),
            ));
        }
        self.ensure_unfinished(board)?;
        let start = Instant::now();
        let rule = &*self.rule;

        if let Some(&five) = five_points(board, color, rule).first() {
            log::info!("{} wins at {}", color, five);
            if let Some(result) = MoveResult::forced(SearchType::ImmediateWin, vec![five], 0, start) {
                return Ok(result);
            }
        }

        let opp_fives = five_points(board, color.opponent(), rule);
        if let Some(&block) = opp_fives.iter().find(|&&p| !rule.is_forbidden(board, p, color)) {
            let score = if opp_fives.len() > 1 {
                -INFINITY
            } else {
                evaluate_position(board, block, color, &self.config.eval, rule)
            };
            log::info!("{} blocks five at {}", color, block);
            return Ok(MoveResult::defense(block, score, start));
        }

        if let Some(result) = self.find_forced_win(board, color, start) {
            return Ok(result);
        }

        let limits = SearchLimits {
            max_depth: self.config.max_depth,
            time_limit_ms: Some(self.config.time_limit_ms),
            node_limit: self.config.node_limit,
            randomness: self.config.randomness,
        };
        let result = self.searcher.search(board, color, &limits)?;
        if result.interrupted {
            log::debug!(
                "alpha-beta stopped at depth {} after {} nodes",
                result.completed_depth,
                result.stats.nodes
            );
        }
        Ok(MoveResult::from_alphabeta(result, start))
    }

    fn ensure_unfinished(&self, board: &Board) -> Result<(), EngineError> {
        match check_winner(board, &*self.rule) {
            Some(winner) => Err(EngineError::InvalidInput(format!(
                "game is already over: {} has five",
                winner
            ))),
            None => Ok(()),
        }
    }

    /// VCF, then Mise-VCF when enabled. `None` when neither proves a win
    /// within its budget.
    fn find_forced_win(&self, board: &Board, color: Stone, start: Instant) -> Option<MoveResult> {
        let rule = &*self.rule;
        let mut vcf = VcfSearcher::new(rule, VcfLimits::with_time_ms(self.config.vcf_time_limit_ms));
        if let Some(line) = vcf.find_vcf_sequence(board, color) {
            log::info!("{} has a VCF of {} moves", color, line.len());
            return MoveResult::forced(SearchType::Vcf, line, vcf.nodes(), start);
        }
        if vcf.is_aborted() {
            log::debug!("VCF budget ran out after {} nodes", vcf.nodes());
        }

        if !self.config.use_mise_vcf {
            return None;
        }
        let limits = VcfLimits::with_time_ms(self.config.mise_vcf_time_limit_ms);
        let mise = find_mise_vcf_sequence(board, color, rule, limits)?;
        log::info!(
            "{} has a Mise-VCF: {} forces {}",
            color,
            mise.first_move,
            mise.defense_move
        );
        MoveResult::forced(SearchType::MiseVcf, mise.sequence, 0, start)
    }

    /// Evaluate one history position: replay the first `move_index` moves
    /// and search for the side to move. A light request only runs the
    /// forced-win stages.
    pub fn evaluate_request(&mut self, request: &EvalRequest) -> Result<EvalResponse, EngineError> {
        let moves = parse_moves(&request.moves)?;
        if request.move_index > moves.len() {
            return Err(ProtocolError::IndexOutOfRange {
                index: request.move_index,
                len: moves.len(),
            }
            .into());
        }
        let board = Board::from_moves(&moves[..request.move_index])?;
        let side = side_to_move(request.move_index);
        let played = moves.get(request.move_index).map(|&p| format_move(p));

        let result = if request.light {
            self.ensure_unfinished(&board)?;
            let start = Instant::now();
            let immediate = five_points(&board, side, &*self.rule)
                .first()
                .and_then(|&p| MoveResult::forced(SearchType::ImmediateWin, vec![p], 0, start));
            immediate.or_else(|| self.find_forced_win(&board, side, start))
        } else {
            Some(self.get_move(&board, side)?)
        };

        let response = match result {
            Some(result) => EvalResponse {
                move_index: request.move_index,
                side,
                played,
                best: Some(format_move(result.best_move)),
                score: result.score,
                forced_win: result.search_type.is_forced_win(),
                sequence: result.sequence.iter().map(|&p| format_move(p)).collect(),
            },
            None => EvalResponse {
                move_index: request.move_index,
                side,
                played,
                best: None,
                score: 0,
                forced_win: false,
                sequence: Vec::new(),
            },
        };
        Ok(response)
    }

    /// Clear the transposition table cache, e.g. before a new game.
    pub fn clear_cache(&mut self) {
        self.searcher.clear_tt();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }
}
