//! Search module
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Candidate generation and move ordering
//! - VCF and Mise-VCF forced-win searches
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod mise;
pub mod movegen;
pub mod tt;
pub mod vcf;
pub mod zobrist;

pub use alphabeta::{SearchLimits, SearchResult, SearchStats, Searcher};
pub use mise::{find_mise_vcf_move, find_mise_vcf_sequence, MiseVcfSequence};
pub use movegen::{candidate_moves, generate_scored_moves, generate_sorted_moves, MoveContext};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use vcf::{VcfLimits, VcfSearcher};
pub use zobrist::ZobristTable;
