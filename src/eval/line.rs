//! Line-shape classification
//!
//! A move is judged one axis at a time. For each axis we read an 11-cell
//! window centred on the candidate square (five cells either side), with the
//! candidate itself treated as the mover's stone. Everything else in the
//! engine (forbidden moves, threat scans, evaluation) is built on top of the
//! [`LineShape`] this produces.
//!
//! For a color bound by the exact-five rule a run of six or more is an
//! overline, never a five.

use crate::board::{Board, Pos, Stone, DIRECTIONS};

/// Cells on either side of the candidate square
pub const REACH: i32 = 5;
/// Window length
pub const WINDOW: usize = 11;
/// Window index of the candidate square
pub const CENTER: usize = 5;

/// A window cell from the mover's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Own,
    Empty,
    /// Opponent stone or off-board
    Blocked,
}

pub type Window = [Cell; WINDOW];

/// What a move makes along one axis, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineShape {
    /// Six or more in a row under the exact-five rule
    Overline,
    /// No five can ever be completed through this square on this axis
    Dead,
    One,
    ClosedTwo,
    OpenTwo,
    ClosedThree,
    OpenThree,
    /// Four with a single completion square
    StopFour,
    /// Two separate fours sharing this axis (e.g. `X.XXX.X`)
    DoubleFour,
    /// Straight four with both ends completing five
    OpenFour,
    Five,
}

impl LineShape {
    /// Fours this shape contributes to a double-four count
    #[inline]
    pub fn four_count(self) -> u32 {
        match self {
            LineShape::StopFour | LineShape::OpenFour => 1,
            LineShape::DoubleFour => 2,
            _ => 0,
        }
    }

    #[inline]
    pub fn is_three(self) -> bool {
        matches!(self, LineShape::OpenThree | LineShape::ClosedThree)
    }
}

/// Read the window through `pos` along `dir`, with `pos` forced to `Own`.
pub fn window(board: &Board, pos: Pos, dir: (i32, i32), color: Stone) -> Window {
    let (dr, dc) = dir;
    let mut cells = [Cell::Blocked; WINDOW];
    for (i, cell) in cells.iter_mut().enumerate() {
        let k = i as i32 - REACH;
        *cell = match pos.step(dr, dc, k) {
            Some(p) => match board.get(p) {
                s if s == color => Cell::Own,
                Stone::Empty => Cell::Empty,
                _ => Cell::Blocked,
            },
            None => Cell::Blocked,
        };
    }
    cells[CENTER] = Cell::Own;
    cells
}

/// Bounds (inclusive) of the contiguous own run through the centre
fn run_bounds(cells: &Window) -> (usize, usize) {
    let mut lo = CENTER;
    while lo > 0 && cells[lo - 1] == Cell::Own {
        lo -= 1;
    }
    let mut hi = CENTER;
    while hi + 1 < WINDOW && cells[hi + 1] == Cell::Own {
        hi += 1;
    }
    (lo, hi)
}

#[inline]
fn is_five_run(len: usize, exact: bool) -> bool {
    if exact {
        len == 5
    } else {
        len >= 5
    }
}

/// Length of the own run through the centre
#[inline]
pub fn run_length(cells: &Window) -> usize {
    let (lo, hi) = run_bounds(cells);
    hi - lo + 1
}

/// Window indices of empty cells that would complete a five containing the centre.
pub fn five_mask(cells: &Window, exact: bool) -> u16 {
    let mut mask = 0u16;
    for i in 1..WINDOW - 1 {
        if cells[i] != Cell::Empty {
            continue;
        }
        let mut probe = *cells;
        probe[i] = Cell::Own;
        let (lo, hi) = run_bounds(&probe);
        if lo <= i && i <= hi && is_five_run(hi - lo + 1, exact) {
            mask |= 1 << i;
        }
    }
    mask
}

/// Four in a row through the centre whose two ends both complete five
fn is_straight_four(cells: &Window, mask: u16) -> bool {
    let (lo, hi) = run_bounds(cells);
    hi - lo + 1 == 4
        && lo >= 1
        && hi + 1 < WINDOW
        && mask & (1 << (lo - 1)) != 0
        && mask & (1 << (hi + 1)) != 0
}

/// Most own stones in any blocker-free five-cell segment through the centre
fn best_segment(cells: &Window) -> Option<usize> {
    (CENTER - 4..=CENTER)
        .map(|s| &cells[s..s + 5])
        .filter(|seg| !seg.contains(&Cell::Blocked))
        .map(|seg| seg.iter().filter(|&&c| c == Cell::Own).count())
        .max()
}

/// A blocker-free six-cell segment with empty ends and two stones inside
fn has_open_six(cells: &Window) -> bool {
    (CENTER - 5..=CENTER).any(|s| {
        let seg = &cells[s..s + 6];
        !seg.contains(&Cell::Blocked)
            && seg[0] == Cell::Empty
            && seg[5] == Cell::Empty
            && seg.iter().filter(|&&c| c == Cell::Own).count() >= 2
    })
}

/// Best three this window can be promoted into, if any.
fn three_shape(cells: &Window, exact: bool) -> Option<LineShape> {
    let mut closed = false;
    for i in 1..WINDOW - 1 {
        if cells[i] != Cell::Empty {
            continue;
        }
        let mut probe = *cells;
        probe[i] = Cell::Own;
        let (lo, hi) = run_bounds(&probe);
        if lo <= i && i <= hi && hi - lo + 1 >= 5 {
            continue;
        }
        let mask = five_mask(&probe, exact);
        match mask.count_ones() {
            0 => {}
            1 => closed = true,
            _ if is_straight_four(&probe, mask) => return Some(LineShape::OpenThree),
            _ => closed = true,
        }
    }
    closed.then_some(LineShape::ClosedThree)
}

/// Classify the window. `exact` applies the exact-five rule.
pub fn classify(cells: &Window, exact: bool) -> LineShape {
    let len = run_length(cells);
    if is_five_run(len, exact) {
        return LineShape::Five;
    }
    if len >= 6 {
        return LineShape::Overline;
    }

    let mask = five_mask(cells, exact);
    match mask.count_ones() {
        0 => {}
        1 => return LineShape::StopFour,
        _ if is_straight_four(cells, mask) => return LineShape::OpenFour,
        _ => return LineShape::DoubleFour,
    }

    let Some(best) = best_segment(cells) else {
        return LineShape::Dead;
    };
    if best >= 3 {
        if let Some(shape) = three_shape(cells, exact) {
            return shape;
        }
    }
    match best {
        0 | 1 => LineShape::One,
        _ if has_open_six(cells) => LineShape::OpenTwo,
        _ => LineShape::ClosedTwo,
    }
}

/// Whether `color` playing `pos` completes a five, skipping full classification.
#[inline]
pub fn completes_five(board: &Board, pos: Pos, color: Stone, exact: bool) -> bool {
    DIRECTIONS
        .iter()
        .any(|&dir| is_five_run(run_length(&window(board, pos, dir, color)), exact))
}

/// Shapes a move makes on all four axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveShape {
    pub axes: [LineShape; 4],
}

impl MoveShape {
    /// Classify `color` playing at `pos` (the square itself is not inspected).
    pub fn analyze(board: &Board, pos: Pos, color: Stone, exact: bool) -> Self {
        let mut axes = [LineShape::Dead; 4];
        for (axis, &dir) in axes.iter_mut().zip(DIRECTIONS.iter()) {
            *axis = classify(&window(board, pos, dir, color), exact);
        }
        Self { axes }
    }

    #[inline]
    fn count(&self, shape: LineShape) -> u32 {
        self.axes.iter().filter(|&&s| s == shape).count() as u32
    }

    #[inline]
    pub fn fives(&self) -> u32 {
        self.count(LineShape::Five)
    }

    #[inline]
    pub fn has_overline(&self) -> bool {
        self.axes.contains(&LineShape::Overline)
    }

    /// Fours made, counting an in-line double four twice
    #[inline]
    pub fn fours(&self) -> u32 {
        self.axes.iter().map(|s| s.four_count()).sum()
    }

    #[inline]
    pub fn open_fours(&self) -> u32 {
        self.count(LineShape::OpenFour)
    }

    #[inline]
    pub fn open_threes(&self) -> u32 {
        self.count(LineShape::OpenThree)
    }

    /// Open and closed threes
    #[inline]
    pub fn threes(&self) -> u32 {
        self.axes.iter().filter(|s| s.is_three()).count() as u32
    }

    #[inline]
    pub fn is_four_three(&self) -> bool {
        self.fours() >= 1 && self.open_threes() >= 1
    }

    #[inline]
    pub fn is_four_four(&self) -> bool {
        self.fours() >= 2
    }
}

/// Empty squares completing a five through `pos` for `color`, assuming `pos`
/// holds (or is about to hold) a `color` stone.
pub fn five_points_through(board: &Board, pos: Pos, color: Stone, exact: bool) -> Vec<Pos> {
    let mut points = Vec::new();
    for &(dr, dc) in &DIRECTIONS {
        let mask = five_mask(&window(board, pos, (dr, dc), color), exact);
        for i in 0..WINDOW {
            if mask & (1 << i) != 0 {
                if let Some(p) = pos.step(dr, dc, i as i32 - REACH) {
                    points.push(p);
                }
            }
        }
    }
    points.sort_unstable();
    points.dedup();
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a window from text: `X` own, `.` empty, `O` blocked. Must be 11 wide
    /// with the candidate at the middle.
    fn w(text: &str) -> Window {
        let mut cells = [Cell::Blocked; WINDOW];
        for (cell, ch) in cells.iter_mut().zip(text.chars()) {
            *cell = match ch {
                'X' => Cell::Own,
                '.' => Cell::Empty,
                _ => Cell::Blocked,
            };
        }
        cells
    }

    #[test]
    fn test_classify_five_and_overline() {
        assert_eq!(classify(&w("...XXXXX..."), true), LineShape::Five);
        assert_eq!(classify(&w("..XXXXXX..."), true), LineShape::Overline);
        assert_eq!(classify(&w("..XXXXXX..."), false), LineShape::Five);
    }

    #[test]
    fn test_classify_fours() {
        assert_eq!(classify(&w("...XXXX...."), true), LineShape::OpenFour);
        assert_eq!(classify(&w("..OXXXX...."), true), LineShape::StopFour);
        assert_eq!(classify(&w("...XXX.X..."), true), LineShape::StopFour);
        assert_eq!(classify(&w(".X.XXX.X..."), true), LineShape::DoubleFour);
    }

    #[test]
    fn test_exact_five_turns_open_four_into_stop_four() {
        // Completing on the left would make six for an exact-five color
        let cells = w(".X.XXXX....");
        assert_eq!(classify(&cells, true), LineShape::StopFour);
        assert_eq!(classify(&cells, false), LineShape::OpenFour);
    }

    #[test]
    fn test_classify_threes() {
        assert_eq!(classify(&w("....XXX...."), true), LineShape::OpenThree);
        assert_eq!(classify(&w("...X.XX...."), true), LineShape::OpenThree);
        assert_eq!(classify(&w("...OXXX...."), true), LineShape::ClosedThree);
        assert_eq!(classify(&w("..X..XX...."), true), LineShape::ClosedThree);
    }

    #[test]
    fn test_classify_twos_and_dead() {
        assert_eq!(classify(&w(".....XX...."), true), LineShape::OpenTwo);
        assert_eq!(classify(&w("....OXX...."), true), LineShape::ClosedTwo);
        assert_eq!(classify(&w(".....X....."), true), LineShape::One);
        assert_eq!(classify(&w("OOO.XX.OOOO"), true), LineShape::Dead);
    }

    #[test]
    fn test_five_mask_positions() {
        let mask = five_mask(&w("...XXXX...."), true);
        assert_eq!(mask, (1 << 2) | (1 << 7));
    }

    #[test]
    fn test_move_shape_four_three() {
        let mut board = Board::new();
        // Horizontal three beside (7,7) and a vertical pair above it
        for c in 4..7 {
            board.place_stone(Pos::new(7, c), Stone::White);
        }
        board.place_stone(Pos::new(5, 7), Stone::White);
        board.place_stone(Pos::new(6, 7), Stone::White);
        let shape = MoveShape::analyze(&board, Pos::new(7, 7), Stone::White, false);
        assert_eq!(shape.axes[0], LineShape::OpenFour);
        assert_eq!(shape.axes[1], LineShape::OpenThree);
        assert!(shape.is_four_three());
    }

    #[test]
    fn test_five_points_through() {
        let mut board = Board::new();
        for c in 3..7 {
            board.place_stone(Pos::new(7, c), Stone::Black);
        }
        let points = five_points_through(&board, Pos::new(7, 6), Stone::Black, true);
        assert_eq!(points, vec![Pos::new(7, 2), Pos::new(7, 7)]);
    }
}
