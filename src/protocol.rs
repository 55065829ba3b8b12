//! Move notation and the per-position evaluation request/response types
//!
//! Columns run `a`..`o` left to right and rows `1`..`15` bottom to top, so
//! `h8` is the centre, `Pos { row: 7, col: 7 }`. A history is a list of
//! such tokens, separated by whitespace or commas or simply concatenated:
//! `"h8 i9, j10"` and `"h8i9j10"` are the same game.

use serde::{Deserialize, Serialize};

use crate::board::{Pos, Stone, BOARD_SIZE};
use crate::error::ProtocolError;

/// Parse one move token such as `h8` or `O15`.
pub fn parse_move(token: &str) -> Result<Pos, ProtocolError> {
    let token = token.trim();
    let mut chars = token.chars();
    let letter = chars.next().ok_or(ProtocolError::EmptyToken)?;
    let col = column_index(letter)?;

    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProtocolError::BadRow(token.to_string()));
    }
    let number: usize = digits
        .parse()
        .map_err(|_| ProtocolError::BadRow(token.to_string()))?;
    if !(1..=BOARD_SIZE).contains(&number) {
        return Err(ProtocolError::BadRow(token.to_string()));
    }
    Ok(Pos::new((BOARD_SIZE - number) as u8, col))
}

/// Parse a whole move history.
pub fn parse_moves(text: &str) -> Result<Vec<Pos>, ProtocolError> {
    let mut moves = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
            continue;
        }
        chars.next();
        let mut end = start + c.len_utf8();
        while let Some(&(i, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = i + d.len_utf8();
            chars.next();
        }
        moves.push(parse_move(&text[start..end])?);
    }
    Ok(moves)
}

/// Format a position as a lowercase token, `h8` for the centre.
pub fn format_move(pos: Pos) -> String {
    let letter = char::from(b'a' + pos.col);
    format!("{}{}", letter, BOARD_SIZE - pos.row as usize)
}

/// Format a history as space-separated tokens.
pub fn format_moves(moves: &[Pos]) -> String {
    moves
        .iter()
        .map(|&p| format_move(p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn column_index(letter: char) -> Result<u8, ProtocolError> {
    let lower = letter.to_ascii_lowercase();
    if ('a'..='o').contains(&lower) {
        Ok(lower as u8 - b'a')
    } else {
        Err(ProtocolError::BadColumn(letter))
    }
}

/// Side to move after `ply` stones have been played (Black moves first).
#[inline]
pub fn side_to_move(ply: usize) -> Stone {
    if ply % 2 == 0 {
        Stone::Black
    } else {
        Stone::White
    }
}

/// Evaluate the position after the first `move_index` moves of a history.
///
/// One request is one independent unit of work; a caller may fan many of
/// them out in parallel, one engine per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalRequest {
    /// Move history in notation
    pub moves: String,
    /// Number of moves replayed before evaluating
    pub move_index: usize,
    /// Only run the forced-win searches
    #[serde(default)]
    pub light: bool,
}

/// Answer to an [`EvalRequest`], tagged with its originating index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalResponse {
    pub move_index: usize,
    /// Side to move at `move_index`
    pub side: Stone,
    /// Move actually played at `move_index`, when the history goes on
    pub played: Option<String>,
    /// Engine's choice; `None` for a light request with no forced win
    pub best: Option<String>,
    pub score: i32,
    /// Whether `best` starts a proven win
    pub forced_win: bool,
    /// Forced line from `best` on, empty when none was proven
    pub sequence: Vec<String>,
}
