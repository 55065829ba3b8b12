//! Transposition Table for caching search results
//!
//! Stores search results indexed by board hash so positions reached by
//! different move orders are searched once.
//!
//! # Example
//!
//! ```
//! use renju::board::Pos;
//! use renju::search::{TranspositionTable, EntryType};
//!
//! let mut tt = TranspositionTable::new(1 << 16);
//!
//! let hash = 0x123456789ABCDEF0;
//! tt.store(hash, 100, 5, EntryType::Exact, Some(Pos::new(7, 7)));
//!
//! if let Some(entry) = tt.probe(hash) {
//!     println!("cached: score={} depth={}", entry.score, entry.depth);
//! }
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::board::Pos;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryType {
    /// Exact score - the search completed normally
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Evaluation score
    pub score: i32,
    /// Search depth for this entry
    pub depth: i32,
    /// Type of score (exact, lower bound, upper bound)
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Pos>,
    /// Table generation at store time
    pub generation: u32,
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TTStats {
    /// Entries currently stored
    pub size: usize,
    /// Current generation
    pub generation: u32,
    /// Capacity before eviction kicks in
    pub max_size: usize,
}

/// Transposition table with depth- and generation-aware replacement.
///
/// One slot per hash. Distinct positions sharing a hash overwrite each other;
/// that collision risk is accepted.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    generation: u32,
    max_size: usize,
}

impl TranspositionTable {
    /// Create a table that holds up to `max_size` entries.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: HashMap::with_capacity(max_size.min(1 << 16)),
            generation: 0,
            max_size,
        }
    }

    /// Exact-hash lookup.
    #[inline]
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.entries.get(&hash).copied()
    }

    /// Best move remembered for move ordering.
    #[inline]
    #[must_use]
    pub fn best_move(&self, hash: u64) -> Option<Pos> {
        self.entries.get(&hash).and_then(|e| e.best_move)
    }

    /// Store a search result.
    ///
    /// An existing entry is replaced when it is more than one generation
    /// old, when the new search is deeper, or when the depths match and the
    /// new score is exact while the old one is only a bound. Otherwise the
    /// existing entry is kept.
    pub fn store(
        &mut self,
        hash: u64,
        score: i32,
        depth: i32,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        let should_replace = match self.entries.get(&hash) {
            None => true,
            Some(e) if self.generation.saturating_sub(e.generation) > 1 => true,
            Some(e) if depth > e.depth => true,
            Some(e) => {
                depth == e.depth && entry_type == EntryType::Exact && e.entry_type != EntryType::Exact
            }
        };
        if !should_replace {
            return;
        }

        self.entries.insert(
            hash,
            TTEntry {
                hash,
                score,
                depth,
                entry_type,
                best_move,
                generation: self.generation,
            },
        );

        if self.entries.len() > self.max_size {
            self.evict();
        }
    }

    /// Drop entries, oldest generation first and shallowest next, until the
    /// table is back to 7/8 of capacity.
    fn evict(&mut self) {
        let target = self.max_size - self.max_size / 8;
        let excess = self.entries.len().saturating_sub(target);
        if excess == 0 {
            return;
        }
        let mut victims: Vec<(u32, i32, u64)> = self
            .entries
            .values()
            .map(|e| (e.generation, e.depth, e.hash))
            .collect();
        victims.sort_unstable();
        for &(_, _, hash) in victims.iter().take(excess) {
            self.entries.remove(&hash);
        }
    }

    /// Start a new generation; entries from two or more generations back
    /// become freely replaceable.
    pub fn new_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop every entry and reset the generation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> TTStats {
        TTStats {
            size: self.entries.len(),
            generation: self.generation,
            max_size: self.max_size,
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(1 << 20)
    }
}
