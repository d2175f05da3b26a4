use crate::error::InvalidState;
use crate::state::GameState;
use crate::types::{BoardStatus, Cell, NextBoard, Side, BOARD_COUNT, CELL_COUNT};

/// Plain-data copy of a [`GameState`], used at the wire boundary.
///
/// Fields are public so decoders can fill them directly; turning a snapshot back
/// into a `GameState` goes through [`TryFrom`], which rejects inconsistent input.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub boards: [[Cell; CELL_COUNT]; BOARD_COUNT],
    pub board_status: [BoardStatus; BOARD_COUNT],
    pub next_board: NextBoard,
    pub winner: Option<Side>,
    pub game_over: bool,
    pub last_move_ms: Option<u64>,
    pub time_remaining_secs: Option<f64>,
    pub timer_duration_secs: Option<f64>,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        GameState::new().snapshot()
    }
}

impl GameState {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            boards: self.boards,
            board_status: self.board_status,
            next_board: self.next_board,
            winner: self.winner,
            game_over: self.game_over,
            last_move_ms: self.last_move_ms,
            time_remaining_secs: self.time_remaining_secs,
            timer_duration_secs: self.timer_duration_secs,
        }
    }
}

impl TryFrom<GameSnapshot> for GameState {
    type Error = InvalidState;

    /// Accept an authority snapshot as-is, after structural checks.
    ///
    /// The authority is the source of truth, so outcomes are not recomputed; only
    /// combinations the rule engine could never act on are refused.
    fn try_from(snap: GameSnapshot) -> Result<Self, Self::Error> {
        if let NextBoard::Board(b) = snap.next_board {
            match snap.board_status.get(b as usize) {
                None => return Err(InvalidState(format!("next board {b} out of range"))),
                Some(status) if !status.is_open() => {
                    return Err(InvalidState(format!("next board {b} is already decided")))
                }
                Some(_) => {}
            }
        }

        if snap.winner.is_some() && !snap.game_over {
            return Err(InvalidState("winner set on an unfinished game".to_string()));
        }

        Ok(Self {
            boards: snap.boards,
            board_status: snap.board_status,
            next_board: snap.next_board,
            winner: snap.winner,
            game_over: snap.game_over,
            last_move_ms: snap.last_move_ms,
            time_remaining_secs: snap.time_remaining_secs,
            timer_duration_secs: snap.timer_duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MoveContext;
    use crate::types::Move;

    #[test]
    fn snapshot_round_trip_preserves_state() {
        let mut state = GameState::new();
        state
            .apply_move(Side::X, Move::new(4, 0).unwrap(), MoveContext::automated(42))
            .unwrap();

        let back = GameState::try_from(state.snapshot()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn snapshot_rejects_decided_next_board() {
        let mut snap = GameSnapshot::default();
        snap.board_status[3] = BoardStatus::Draw;
        snap.next_board = NextBoard::Board(3);
        assert!(GameState::try_from(snap).is_err());
    }

    #[test]
    fn snapshot_rejects_winner_without_game_over() {
        let snap = GameSnapshot {
            winner: Some(Side::O),
            ..GameSnapshot::default()
        };
        assert!(GameState::try_from(snap).is_err());
    }
}
