//! Game state module - the single mutable aggregate of a match
//!
//! A `GameState` holds the nine sub-boards, their outcomes, the next-board
//! constraint and the global result. It is only ever mutated through
//! [`GameState::apply_move`](crate::rules) or replaced wholesale.

use crate::types::*;

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(crate) boards: [[Cell; CELL_COUNT]; BOARD_COUNT],
    pub(crate) board_status: [BoardStatus; BOARD_COUNT],
    pub(crate) next_board: NextBoard,
    pub(crate) winner: Option<Side>,
    pub(crate) game_over: bool,
    /// Caller clock (ms) of the last accepted move.
    pub(crate) last_move_ms: Option<u64>,
    /// Pacing hints surfaced by the authority; local simulations leave these unset.
    pub(crate) time_remaining_secs: Option<f64>,
    pub(crate) timer_duration_secs: Option<f64>,
}

impl GameState {
    /// Create an empty game: every cell empty, every board open, any board playable.
    pub fn new() -> Self {
        Self {
            boards: [[None; CELL_COUNT]; BOARD_COUNT],
            board_status: [BoardStatus::Open; BOARD_COUNT],
            next_board: NextBoard::Any,
            winner: None,
            game_over: false,
            last_move_ms: None,
            time_remaining_secs: None,
            timer_duration_secs: None,
        }
    }

    pub fn boards(&self) -> &[[Cell; CELL_COUNT]; BOARD_COUNT] {
        &self.boards
    }

    pub fn sub_board(&self, board: u8) -> Option<&[Cell; CELL_COUNT]> {
        self.boards.get(board as usize)
    }

    /// Mark at `(board, cell)`; `None` for out-of-range indices.
    pub fn cell(&self, board: u8, cell: u8) -> Option<Cell> {
        self.boards
            .get(board as usize)
            .and_then(|b| b.get(cell as usize))
            .copied()
    }

    pub fn board_status(&self) -> &[BoardStatus; BOARD_COUNT] {
        &self.board_status
    }

    pub fn status_of(&self, board: u8) -> Option<BoardStatus> {
        self.board_status.get(board as usize).copied()
    }

    pub fn next_board(&self) -> NextBoard {
        self.next_board
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn last_move_ms(&self) -> Option<u64> {
        self.last_move_ms
    }

    pub fn time_remaining_secs(&self) -> Option<f64> {
        self.time_remaining_secs
    }

    pub fn timer_duration_secs(&self) -> Option<f64> {
        self.timer_duration_secs
    }

    /// Number of sub-boards that are won or drawn.
    pub fn decided_boards(&self) -> usize {
        self.board_status.iter().filter(|s| !s.is_open()).count()
    }

    /// Number of marks placed so far.
    pub fn move_count(&self) -> usize {
        self.boards
            .iter()
            .map(|b| b.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    /// Whether `board` is currently a legal target for the next mover.
    pub fn is_board_playable(&self, board: u8) -> bool {
        !self.game_over
            && self.next_board.allows(board)
            && self.status_of(board).is_some_and(|s| s.is_open())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = GameState::new();
        assert_eq!(state.move_count(), 0);
        assert_eq!(state.decided_boards(), 0);
        assert_eq!(state.next_board(), NextBoard::Any);
        assert_eq!(state.winner(), None);
        assert!(!state.game_over());
        assert_eq!(state.last_move_ms(), None);
        for b in 0..9 {
            assert!(state.is_board_playable(b));
        }
    }

    #[test]
    fn test_cell_out_of_range() {
        let state = GameState::new();
        assert_eq!(state.cell(0, 0), Some(None));
        assert_eq!(state.cell(9, 0), None);
        assert_eq!(state.cell(0, 9), None);
    }

    #[test]
    fn test_playable_respects_constraint() {
        let mut state = GameState::new();
        state.next_board = NextBoard::Board(2);
        assert!(state.is_board_playable(2));
        assert!(!state.is_board_playable(3));

        state.next_board = NextBoard::Any;
        state.board_status[5] = BoardStatus::Draw;
        assert!(!state.is_board_playable(5));

        state.game_over = true;
        assert!(!state.is_board_playable(0));
    }
}
