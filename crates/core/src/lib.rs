//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the Super Tic-Tac-Toe rules, the game state aggregate and
//! the heuristic AI. It has **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical AI games
//! - **Testable**: Every rule and invariant is covered by unit tests
//! - **Shared**: The local simulation and the remote mirror are the same type
//!
//! # Module Structure
//!
//! - [`state`]: The `GameState` aggregate (9 sub-boards, outcomes, constraint, result)
//! - [`rules`]: Move validation/application and the shared 8-line win scan
//! - [`ai`]: Priority-based move selection (win, block, centre, corner, any)
//! - [`rng`]: Deterministic LCG used by the AI
//! - [`snapshot`]: Plain-data state copies for the wire boundary
//!
//! # Game Rules
//!
//! - A move's cell index names the sub-board the opponent must play next
//! - If that sub-board is already won or drawn, the opponent may play any open one
//! - Three aligned marks win a sub-board; a full sub-board with no line is a draw
//! - Three aligned won sub-boards win the game; drawn sub-boards belong to nobody
//! - The game also ends when no open sub-board remains
//!
//! # Example
//!
//! ```
//! use super_ttt_core::{GameState, MoveContext};
//! use super_ttt_types::{Move, NextBoard, Side};
//!
//! let mut game = GameState::new();
//! game.apply_move(Side::X, Move::new(4, 0).unwrap(), MoveContext::automated(0))
//!     .unwrap();
//!
//! assert_eq!(game.next_board(), NextBoard::Board(0));
//! assert!(game.apply_move(Side::O, Move::new(5, 0).unwrap(), MoveContext::automated(1)).is_err());
//! ```

pub mod ai;
pub mod error;
pub mod rng;
pub mod rules;
pub mod snapshot;
pub mod state;

pub use super_ttt_types as types;

// Re-export commonly used types for convenience
pub use ai::select_move;
pub use error::{AiError, InvalidState, MoveError};
pub use rng::SimpleRng;
pub use rules::{
    board_outcome, global_winner, is_winning_move, legal_moves, validate_and_apply_move,
    winning_line, MoveContext,
};
pub use snapshot::GameSnapshot;
pub use state::GameState;
