//! Protocol module - JSON message types exchanged with the authority
//!
//! Line-delimited JSON: one object per line, discriminated by `type`.
//! Requests carry a client-chosen `seq`; responses echo it. Push messages
//! (`game_update`, `chat_message` from the authority) carry no `seq`.
//!
//! Game payloads are kept as raw [`serde_json::Value`] inside messages so a
//! malformed game never fails the surrounding message; [`decode_game`] turns
//! them into a [`GameState`] or reports [`SyncError::InvalidRemoteState`].

use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, GameState};
use crate::error::SyncError;
use crate::types::{BoardStatus, Cell, Move, NextBoard, Side, BOARD_COUNT, CELL_COUNT};

// ============== Client -> Authority Messages ==============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Place `team`'s mark at (`board`, `cell`).
    Move {
        seq: u64,
        team: String,
        board: u8,
        cell: u8,
    },
    /// Fetch the full current game.
    Snapshot { seq: u64 },
    /// Replace the game with an empty one.
    Reset { seq: u64 },
    /// Cosmetic side channel.
    ChatMessage {
        seq: u64,
        username: String,
        message: String,
    },
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Move { seq, .. }
            | ClientMessage::Snapshot { seq }
            | ClientMessage::Reset { seq }
            | ClientMessage::ChatMessage { seq, .. } => *seq,
        }
    }
}

// ============== Authority -> Client Messages ==============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthorityMessage {
    MoveResult {
        seq: u64,
        success: bool,
        #[serde(default)]
        message: String,
        #[serde(default)]
        game: Option<serde_json::Value>,
    },
    Snapshot {
        seq: u64,
        game: serde_json::Value,
    },
    ResetResult {
        seq: u64,
        success: bool,
        #[serde(default)]
        game: Option<serde_json::Value>,
    },
    /// Pushed on every authoritative change.
    GameUpdate { game: serde_json::Value },
    ChatMessage { username: String, message: String },
}

impl AuthorityMessage {
    /// Sequence number of the request this message answers, if any.
    pub fn seq(&self) -> Option<u64> {
        match self {
            AuthorityMessage::MoveResult { seq, .. }
            | AuthorityMessage::Snapshot { seq, .. }
            | AuthorityMessage::ResetResult { seq, .. } => Some(*seq),
            AuthorityMessage::GameUpdate { .. } | AuthorityMessage::ChatMessage { .. } => None,
        }
    }
}

/// Parse a single line from the authority.
pub fn parse_authority_line(line: &str) -> Result<AuthorityMessage, SyncError> {
    serde_json::from_str(line.trim()).map_err(|e| SyncError::InvalidRemoteState(e.to_string()))
}

// ============== Game payload ==============

/// The authority's game object, field for field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGame {
    pub boards: Vec<Vec<String>>,
    pub board_winners: Vec<String>,
    pub next_board: i8,
    pub winner: String,
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_move_timestamp: Option<u64>,
}

impl From<&GameState> for WireGame {
    fn from(state: &GameState) -> Self {
        let label = |c: &Cell| c.map(|s| s.as_str()).unwrap_or("").to_string();
        Self {
            boards: state
                .boards()
                .iter()
                .map(|b| b.iter().map(label).collect())
                .collect(),
            board_winners: state
                .board_status()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            next_board: state.next_board().to_index(),
            winner: state.winner().map(|s| s.as_str()).unwrap_or("").to_string(),
            game_over: state.game_over(),
            time_remaining: state.time_remaining_secs(),
            timer_duration: state.timer_duration_secs(),
            last_move_timestamp: state.last_move_ms(),
        }
    }
}

impl TryFrom<WireGame> for GameState {
    type Error = SyncError;

    fn try_from(wire: WireGame) -> Result<Self, Self::Error> {
        let invalid = |msg: String| SyncError::InvalidRemoteState(msg);

        if wire.boards.len() != BOARD_COUNT {
            return Err(invalid(format!("expected {BOARD_COUNT} boards, got {}", wire.boards.len())));
        }
        if wire.board_winners.len() != BOARD_COUNT {
            return Err(invalid(format!(
                "expected {BOARD_COUNT} board winners, got {}",
                wire.board_winners.len()
            )));
        }

        let mut snap = GameSnapshot::default();
        for (b, cells) in wire.boards.iter().enumerate() {
            if cells.len() != CELL_COUNT {
                return Err(invalid(format!("board {b} has {} cells", cells.len())));
            }
            for (c, label) in cells.iter().enumerate() {
                snap.boards[b][c] = parse_cell(label)
                    .ok_or_else(|| invalid(format!("bad mark {label:?} at {b}/{c}")))?;
            }
        }
        for (b, label) in wire.board_winners.iter().enumerate() {
            snap.board_status[b] = BoardStatus::from_str(label)
                .ok_or_else(|| invalid(format!("bad board winner {label:?} at {b}")))?;
        }

        snap.next_board = NextBoard::from_index(wire.next_board)
            .ok_or_else(|| invalid(format!("bad nextBoard {}", wire.next_board)))?;
        snap.winner = parse_cell(&wire.winner)
            .ok_or_else(|| invalid(format!("bad winner {:?}", wire.winner)))?;
        snap.game_over = wire.game_over;
        snap.last_move_ms = wire.last_move_timestamp;
        snap.time_remaining_secs = wire.time_remaining.map(|t| t.max(0.0));
        snap.timer_duration_secs = wire.timer_duration;

        GameState::try_from(snap).map_err(|e| invalid(e.to_string()))
    }
}

fn parse_cell(label: &str) -> Option<Cell> {
    if label.trim().is_empty() {
        Some(None)
    } else {
        Side::from_str(label).map(Some)
    }
}

/// Decode a raw game payload.
pub fn decode_game(value: &serde_json::Value) -> Result<GameState, SyncError> {
    let wire: WireGame = serde_json::from_value(value.clone())
        .map_err(|e| SyncError::InvalidRemoteState(e.to_string()))?;
    GameState::try_from(wire)
}

/// Encode a game as the authority's JSON object.
pub fn encode_game(state: &GameState) -> serde_json::Value {
    serde_json::to_value(WireGame::from(state)).unwrap_or(serde_json::Value::Null)
}

// ============== Helper functions ==============

pub fn create_move(seq: u64, side: Side, mv: Move) -> ClientMessage {
    ClientMessage::Move {
        seq,
        team: side.as_str().to_string(),
        board: mv.board,
        cell: mv.cell,
    }
}

pub fn create_snapshot_request(seq: u64) -> ClientMessage {
    ClientMessage::Snapshot { seq }
}

pub fn create_reset(seq: u64) -> ClientMessage {
    ClientMessage::Reset { seq }
}

pub fn create_chat(seq: u64, side: Side, text: &str) -> ClientMessage {
    ClientMessage::ChatMessage {
        seq,
        username: side.as_str().to_string(),
        message: text.to_string(),
    }
}
