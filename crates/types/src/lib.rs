//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (rule engine, session routing, wire protocol, rendering).
//!
//! # Board Layout
//!
//! The global board is a 3x3 arrangement of sub-boards, each itself a 3x3 grid.
//! Both levels are indexed row-major:
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```
//!
//! A move names a sub-board (`board`) and a cell inside it (`cell`). The cell index of
//! the last move names the sub-board the opponent must play next.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MOVE_COOLDOWN_MS` | 2000 | Pacing interval between human moves |
//! | `POLL_INTERVAL_MS` | 2000 | Snapshot poll fallback interval |
//! | `AI_DELAY_MIN_MS` | 500 | Shortest simulated AI deliberation |
//! | `AI_DELAY_MAX_MS` | 1500 | Longest simulated AI deliberation |
//! | `TICK_MS` | 50 | Front-end loop timestep |
//!
//! # Examples
//!
//! ```
//! use super_ttt_types::{Move, NextBoard, Side};
//!
//! assert_eq!(Side::from_str("x"), Some(Side::X));
//! assert_eq!(Side::X.opponent(), Side::O);
//!
//! let mv = Move::new(4, 0).unwrap();
//! assert_eq!(mv.board, 4);
//! assert!(Move::new(9, 0).is_none());
//!
//! assert_eq!(NextBoard::from_index(-1), Some(NextBoard::Any));
//! assert_eq!(NextBoard::Board(3).to_index(), 3);
//! ```

/// Number of sub-boards on the global board.
pub const BOARD_COUNT: usize = 9;

/// Number of cells in a sub-board.
pub const CELL_COUNT: usize = 9;

/// Centre cell of a 3x3 grid.
pub const CENTER_CELL: u8 = 4;

/// Corner cells of a 3x3 grid.
pub const CORNER_CELLS: [u8; 4] = [0, 2, 6, 8];

/// The eight winning lines of a 3x3 grid, scanned rows first, then columns, then diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Pacing interval between non-automated moves (authority parity: 2 seconds).
pub const MOVE_COOLDOWN_MS: u64 = 2000;

/// Snapshot poll fallback interval.
pub const POLL_INTERVAL_MS: u64 = 2000;

/// Lower bound of the simulated AI deliberation delay.
pub const AI_DELAY_MIN_MS: u64 = 500;

/// Upper bound of the simulated AI deliberation delay.
pub const AI_DELAY_MAX_MS: u64 = 1500;

/// Fixed timestep of the terminal front end.
pub const TICK_MS: u64 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_parity_timing_defaults() {
        assert_eq!(MOVE_COOLDOWN_MS, 2000);
        assert_eq!(POLL_INTERVAL_MS, 2000);
        assert_eq!(AI_DELAY_MIN_MS, 500);
        assert_eq!(AI_DELAY_MAX_MS, 1500);
    }

    #[test]
    fn win_lines_cover_every_cell() {
        for cell in 0..CELL_COUNT {
            assert!(WIN_LINES.iter().any(|l| l.contains(&cell)));
        }
        // Centre sits on two diagonals, a row and a column.
        assert_eq!(
            WIN_LINES.iter().filter(|l| l.contains(&(CENTER_CELL as usize))).count(),
            4
        );
    }

    #[test]
    fn next_board_index_round_trip() {
        assert_eq!(NextBoard::Any.to_index(), -1);
        for i in 0..9u8 {
            assert_eq!(NextBoard::from_index(i as i8), Some(NextBoard::Board(i)));
        }
        assert_eq!(NextBoard::from_index(9), None);
        assert_eq!(NextBoard::from_index(-2), None);
    }
}

/// One of the two playing sides.
///
/// The authority calls these "teams"; the label is the mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    X,
    O,
}

impl Side {
    /// Parse a side label (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use super_ttt_types::Side;
    ///
    /// assert_eq!(Side::from_str("X"), Some(Side::X));
    /// assert_eq!(Side::from_str("o"), Some(Side::O));
    /// assert_eq!(Side::from_str(""), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "x" => Some(Side::X),
            "o" => Some(Side::O),
            _ => None,
        }
    }

    /// Uppercase label used on the wire and on screen.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::X => "X",
            Side::O => "O",
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }
}

/// A cell of a sub-board
///
/// - `None`: Empty cell
/// - `Some(Side)`: Cell marked by that side
pub type Cell = Option<Side>;

/// Outcome of a single sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoardStatus {
    /// Still playable.
    #[default]
    Open,
    /// Three aligned marks of one side.
    Won(Side),
    /// Full with no alignment.
    Draw,
}

impl BoardStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, BoardStatus::Open)
    }

    /// The side owning this board on the global grid. Draws belong to nobody.
    pub fn winner(&self) -> Option<Side> {
        match self {
            BoardStatus::Won(side) => Some(*side),
            BoardStatus::Open | BoardStatus::Draw => None,
        }
    }

    /// Wire label: `""`, `"X"`, `"O"` or `"D"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardStatus::Open => "",
            BoardStatus::Won(side) => side.as_str(),
            BoardStatus::Draw => "D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "" => Some(BoardStatus::Open),
            "D" | "d" => Some(BoardStatus::Draw),
            other => Side::from_str(other).map(BoardStatus::Won),
        }
    }
}

/// Sub-board constraint for the next mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NextBoard {
    /// Any open sub-board may be played.
    #[default]
    Any,
    /// Only this sub-board may be played.
    Board(u8),
}

impl NextBoard {
    /// Decode the authority's integer form (`-1` means any board).
    pub fn from_index(index: i8) -> Option<Self> {
        match index {
            -1 => Some(NextBoard::Any),
            0..=8 => Some(NextBoard::Board(index as u8)),
            _ => None,
        }
    }

    pub fn to_index(&self) -> i8 {
        match self {
            NextBoard::Any => -1,
            NextBoard::Board(b) => *b as i8,
        }
    }

    /// Whether a move on `board` satisfies this constraint.
    pub fn allows(&self, board: u8) -> bool {
        match self {
            NextBoard::Any => true,
            NextBoard::Board(b) => *b == board,
        }
    }
}

/// A move target: sub-board index and cell index, both in `0..9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub board: u8,
    pub cell: u8,
}

impl Move {
    /// Create a move, returning `None` when either index is out of range.
    pub fn new(board: u8, cell: u8) -> Option<Self> {
        if (board as usize) < BOARD_COUNT && (cell as usize) < CELL_COUNT {
            Some(Self { board, cell })
        } else {
            None
        }
    }

    pub fn is_center(&self) -> bool {
        self.cell == CENTER_CELL
    }

    pub fn is_corner(&self) -> bool {
        CORNER_CELLS.contains(&self.cell)
    }
}
