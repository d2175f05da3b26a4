use thiserror::Error;

/// Reasons a move is rejected by the rule engine.
///
/// A rejected move never mutates the state it was validated against.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("board {board} / cell {cell} is out of range")]
    OutOfRange { board: u8, cell: u8 },

    #[error("the game is already over")]
    GameOver,

    #[error("Not time for the next move yet ({remaining_ms}ms remaining)")]
    CooldownActive { remaining_ms: u64 },

    #[error("Invalid move! You must play on board {required}")]
    WrongBoard { required: u8 },

    #[error("Cell already taken")]
    CellOccupied,

    #[error("board {0} is already decided")]
    BoardDecided(u8),
}

/// Errors from the AI move selector.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiError {
    #[error("No legal moves available")]
    NoLegalMoves,
}

/// A snapshot that cannot be turned into a consistent game state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid game state: {0}")]
pub struct InvalidState(pub String);
