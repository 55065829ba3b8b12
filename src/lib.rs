//! Renju move-search engine
//!
//! A 15x15 renju engine that chooses moves and proves forced wins:
//! - Five in a row wins; Black must make exactly five
//! - Black may not play double-three, double-four or overline
//! - White is unrestricted; six or more also wins for White
//!
//! # Architecture
//!
//! - [`board`]: Board representation with bitboards
//! - [`rules`]: Win detection and forbidden moves
//! - [`eval`]: Square and board evaluation
//! - [`search`]: Alpha-beta, VCF and Mise-VCF searches
//! - [`engine`]: Search ladder used by callers
//! - [`protocol`]: Move notation and per-position requests
//! - [`config`]: Engine configuration
//!
//! # Quick Start
//!
//! ```
//! use renju::{Board, Engine, EngineConfig, Pos, Stone};
//!
//! let mut board = Board::new();
//! let config = EngineConfig { max_depth: 2, time_limit_ms: 500, ..EngineConfig::default() };
//! let mut engine = Engine::new(config).unwrap();
//!
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//!
//! let result = engine.get_move(&board, Stone::White).unwrap();
//! board.place_stone(result.best_move, Stone::White);
//! println!("engine plays {}", result.best_move);
//! ```
//!
//! # Search Priority
//!
//! 1. Immediate five
//! 2. Block the opponent's five
//! 3. VCF: victory by continuous fours
//! 4. Mise-VCF: one quiet forcing move, then VCF
//! 5. Alpha-Beta search with transposition table

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod protocol;
pub mod rules;
pub mod search;

pub use board::{Board, Pos, Stone, BOARD_SIZE};
pub use config::EngineConfig;
pub use engine::{Engine, MoveResult, SearchType};
pub use error::{EngineError, ProtocolError};
