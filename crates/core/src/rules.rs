//! Rules module - move validation, move application and win detection
//!
//! Local (sub-board) and global wins share one algorithm: [`winning_line`], an
//! 8-line scan over a 3x3 grid of optional marks. A sub-board feeds it its
//! cells; the global board feeds it the sub-board winners (draws count as empty).

use arrayvec::ArrayVec;

use crate::error::MoveError;
use crate::state::GameState;
use crate::types::*;

/// Pacing context for a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveContext {
    /// Caller clock in milliseconds; stamped into the state on success.
    pub now_ms: u64,
    /// Automated moves skip the pacing cooldown.
    pub automated: bool,
    pub cooldown_ms: u64,
}

impl MoveContext {
    /// A move that is exempt from pacing (AI moves, local simulation).
    pub fn automated(now_ms: u64) -> Self {
        Self {
            now_ms,
            automated: true,
            cooldown_ms: 0,
        }
    }

    /// A human move subject to `cooldown_ms` since the previous accepted move.
    pub fn paced(now_ms: u64, cooldown_ms: u64) -> Self {
        Self {
            now_ms,
            automated: false,
            cooldown_ms,
        }
    }
}

/// Scan the 8 lines of a 3x3 grid; rows, then columns, then diagonals.
///
/// Returns the side owning the first fully aligned line.
pub fn winning_line(marks: &[Option<Side>; 9]) -> Option<Side> {
    WIN_LINES.iter().find_map(|&[a, b, c]| match marks[a] {
        Some(side) if marks[b] == Some(side) && marks[c] == Some(side) => Some(side),
        _ => None,
    })
}

/// Outcome of a sub-board from its cells.
pub fn board_outcome(cells: &[Cell; CELL_COUNT]) -> BoardStatus {
    match winning_line(cells) {
        Some(side) => BoardStatus::Won(side),
        None if cells.iter().all(|c| c.is_some()) => BoardStatus::Draw,
        None => BoardStatus::Open,
    }
}

/// Global winner from the sub-board outcomes.
pub fn global_winner(status: &[BoardStatus; BOARD_COUNT]) -> Option<Side> {
    winning_line(&status.map(|s| s.winner()))
}

/// Pure lookahead: would `side` win sub-board `board` by playing `cell`?
///
/// Only the affected sub-board is copied; `state` is never touched. Occupied
/// cells and out-of-range indices are never winning.
pub fn is_winning_move(state: &GameState, board: u8, cell: u8, side: Side) -> bool {
    let Some(cells) = state.sub_board(board) else {
        return false;
    };
    let Some(slot) = cells.get(cell as usize) else {
        return false;
    };
    if slot.is_some() {
        return false;
    }

    let mut trial = *cells;
    trial[cell as usize] = Some(side);
    winning_line(&trial) == Some(side)
}

/// Every legal move for the next mover.
///
/// With the any-board sentinel this is every empty cell of every open
/// sub-board; otherwise the empty cells of the constrained sub-board.
pub fn legal_moves(state: &GameState) -> ArrayVec<Move, 81> {
    let mut out = ArrayVec::new();
    if state.game_over {
        return out;
    }

    for board in 0..BOARD_COUNT as u8 {
        if !state.is_board_playable(board) {
            continue;
        }
        for (cell, mark) in state.boards[board as usize].iter().enumerate() {
            if mark.is_none() {
                out.push(Move {
                    board,
                    cell: cell as u8,
                });
            }
        }
    }
    out
}

/// Validate `mv` for `side` and return the resulting state.
///
/// `state` is left untouched whether the move is accepted or not.
pub fn validate_and_apply_move(
    state: &GameState,
    side: Side,
    mv: Move,
    ctx: MoveContext,
) -> Result<GameState, MoveError> {
    let mut next = state.clone();
    next.apply_move(side, mv, ctx)?;
    Ok(next)
}

impl GameState {
    /// Check a move without applying it.
    ///
    /// Checks run in a fixed order: range, game over, cooldown, wrong board,
    /// occupied cell, decided board.
    pub fn validate_move(&self, mv: Move, ctx: MoveContext) -> Result<(), MoveError> {
        if mv.board as usize >= BOARD_COUNT || mv.cell as usize >= CELL_COUNT {
            return Err(MoveError::OutOfRange {
                board: mv.board,
                cell: mv.cell,
            });
        }

        if self.game_over {
            return Err(MoveError::GameOver);
        }

        if !ctx.automated {
            if let Some(last) = self.last_move_ms {
                let ready_at = last.saturating_add(ctx.cooldown_ms);
                if ctx.now_ms < ready_at {
                    return Err(MoveError::CooldownActive {
                        remaining_ms: ready_at - ctx.now_ms,
                    });
                }
            }
        }

        if let NextBoard::Board(required) = self.next_board {
            if mv.board != required {
                return Err(MoveError::WrongBoard { required });
            }
        }

        if self.boards[mv.board as usize][mv.cell as usize].is_some() {
            return Err(MoveError::CellOccupied);
        }

        if !self.board_status[mv.board as usize].is_open() {
            return Err(MoveError::BoardDecided(mv.board));
        }

        Ok(())
    }

    /// Validate and apply a move in place.
    ///
    /// On error the state is unchanged.
    pub fn apply_move(&mut self, side: Side, mv: Move, ctx: MoveContext) -> Result<(), MoveError> {
        self.validate_move(mv, ctx)?;

        let b = mv.board as usize;
        self.boards[b][mv.cell as usize] = Some(side);
        self.board_status[b] = board_outcome(&self.boards[b]);

        self.next_board = if self.board_status[mv.cell as usize].is_open() {
            NextBoard::Board(mv.cell)
        } else {
            NextBoard::Any
        };

        self.winner = global_winner(&self.board_status);
        if self.winner.is_some() || self.board_status.iter().all(|s| !s.is_open()) {
            self.game_over = true;
        }

        self.last_move_ms = Some(ctx.now_ms);
        Ok(())
    }
}
