//! AI module - heuristic move selection for the local opponent
//!
//! The selector walks a fixed priority list and plays a random move from the
//! first non-empty category:
//!
//! 1. win the sub-board now
//! 2. block the opponent from winning the sub-board
//! 3. take a centre cell
//! 4. take a corner cell
//! 5. anything legal

use arrayvec::ArrayVec;

use crate::error::AiError;
use crate::rng::SimpleRng;
use crate::rules::{is_winning_move, legal_moves};
use crate::state::GameState;
use crate::types::{Move, Side};

/// Select a move for `side`.
///
/// Returns [`AiError::NoLegalMoves`] when the state has no legal move; callers
/// are expected to check `game_over` first.
pub fn select_move(state: &GameState, side: Side, rng: &mut SimpleRng) -> Result<Move, AiError> {
    let legal = legal_moves(state);
    if legal.is_empty() {
        return Err(AiError::NoLegalMoves);
    }

    let opponent = side.opponent();
    let categories: [&dyn Fn(&Move) -> bool; 4] = [
        &|m: &Move| is_winning_move(state, m.board, m.cell, side),
        &|m: &Move| is_winning_move(state, m.board, m.cell, opponent),
        &|m: &Move| m.is_center(),
        &|m: &Move| m.is_corner(),
    ];

    for accept in categories {
        let candidates: ArrayVec<Move, 81> = legal.iter().copied().filter(|m| accept(m)).collect();
        if let Some(choice) = rng.pick(&candidates) {
            return Ok(*choice);
        }
    }

    rng.pick(&legal).copied().ok_or(AiError::NoLegalMoves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MoveContext;
    use crate::types::{BoardStatus, NextBoard};

    fn play(state: &mut GameState, side: Side, board: u8, cell: u8) {
        state
            .apply_move(side, Move::new(board, cell).unwrap(), MoveContext::automated(0))
            .unwrap();
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut state = GameState::new();
        state.boards[3][0] = Some(Side::O);
        state.boards[3][4] = Some(Side::O);
        state.next_board = NextBoard::Board(3);

        for seed in 1..20 {
            let mut rng = SimpleRng::new(seed);
            assert_eq!(
                select_move(&state, Side::O, &mut rng),
                Ok(Move::new(3, 8).unwrap())
            );
        }
    }

    #[test]
    fn test_blocks_opponent_win() {
        let mut state = GameState::new();
        state.boards[1][2] = Some(Side::X);
        state.boards[1][5] = Some(Side::X);
        state.next_board = NextBoard::Board(1);

        let mut rng = SimpleRng::new(3);
        assert_eq!(
            select_move(&state, Side::O, &mut rng),
            Ok(Move::new(1, 8).unwrap())
        );
    }

    #[test]
    fn test_prefers_center_then_corner() {
        let mut state = GameState::new();
        state.next_board = NextBoard::Board(7);
        let mut rng = SimpleRng::new(11);
        assert_eq!(
            select_move(&state, Side::O, &mut rng),
            Ok(Move::new(7, 4).unwrap())
        );

        state.boards[7][4] = Some(Side::X);
        for seed in 1..30 {
            let mut rng = SimpleRng::new(seed);
            let m = select_move(&state, Side::O, &mut rng).unwrap();
            assert_eq!(m.board, 7);
            assert!(m.is_corner(), "expected a corner, got {m:?}");
        }
    }

    #[test]
    fn test_any_board_centres_are_spread() {
        let state = GameState::new();
        let mut boards = [false; 9];
        for seed in 1..200 {
            let mut rng = SimpleRng::new(seed);
            let m = select_move(&state, Side::X, &mut rng).unwrap();
            assert!(m.is_center());
            boards[m.board as usize] = true;
        }
        assert!(boards.iter().filter(|b| **b).count() > 4);
    }

    #[test]
    fn test_falls_back_to_edges() {
        let mut state = GameState::new();
        let x = Some(Side::X);
        let o = Some(Side::O);
        // X O X / _ X _ / O X O: centre and corners taken, no open line threatened.
        state.boards[0] = [x, o, x, None, x, None, o, x, o];
        state.board_status[0] = BoardStatus::Open;
        state.next_board = NextBoard::Board(0);
        for seed in 1..20 {
            let mut rng = SimpleRng::new(seed);
            let m = select_move(&state, Side::O, &mut rng).unwrap();
            assert_eq!(m.board, 0);
            assert!([3, 5].contains(&m.cell));
        }
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let mut state = GameState::new();
        play(&mut state, Side::X, 0, 0);
        state.game_over = true;
        let mut rng = SimpleRng::new(1);
        assert_eq!(select_move(&state, Side::O, &mut rng), Err(AiError::NoLegalMoves));
    }
}
