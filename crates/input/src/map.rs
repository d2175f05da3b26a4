//! Key mapping from terminal events to session intents.

use crate::types::{Move, Side};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Edge length of the full 9x9 grid the cursor walks.
const GRID: u8 = 9;

/// What the player asked for, independent of the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Place a mark under the cursor.
    Place,
    Reset,
    /// Play against the authority as this side.
    PlayRemote(Side),
    /// Play against the local AI, taking this side.
    PlayAi(Side),
    /// Start composing a chat line.
    Chat,
    /// Back to the landing screen.
    Back,
    Quit,
}

/// Map keyboard input to session intents.
pub fn handle_key_event(key: KeyEvent) -> Option<UiCommand> {
    if should_quit(key) {
        return Some(UiCommand::Quit);
    }

    match key.code {
        // Cursor
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Some(UiCommand::CursorUp),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Some(UiCommand::CursorDown),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => Some(UiCommand::CursorLeft),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => Some(UiCommand::CursorRight),

        KeyCode::Enter | KeyCode::Char(' ') => Some(UiCommand::Place),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiCommand::Reset),

        // Mode selection
        KeyCode::Char('x') | KeyCode::Char('X') => Some(UiCommand::PlayRemote(Side::X)),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(UiCommand::PlayRemote(Side::O)),
        KeyCode::Char('a') => Some(UiCommand::PlayAi(Side::X)),
        KeyCode::Char('A') => Some(UiCommand::PlayAi(Side::O)),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(UiCommand::Chat),
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => Some(UiCommand::Back),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Selection on the 9x9 grid of cells, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    row: u8,
    col: u8,
}

impl Default for Cursor {
    /// Centre cell of the centre board.
    fn default() -> Self {
        Self { row: 4, col: 4 }
    }
}

impl Cursor {
    pub fn new(row: u8, col: u8) -> Self {
        Self {
            row: row.min(GRID - 1),
            col: col.min(GRID - 1),
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// Apply a cursor command; other commands are ignored. Moves clamp at the edges.
    pub fn apply(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::CursorUp => self.row = self.row.saturating_sub(1),
            UiCommand::CursorDown => self.row = (self.row + 1).min(GRID - 1),
            UiCommand::CursorLeft => self.col = self.col.saturating_sub(1),
            UiCommand::CursorRight => self.col = (self.col + 1).min(GRID - 1),
            _ => {}
        }
    }

    /// The (board, cell) under the cursor.
    pub fn to_move(&self) -> Move {
        let board = (self.row / 3) * 3 + self.col / 3;
        let cell = (self.row % 3) * 3 + self.col % 3;
        Move { board, cell }
    }

    pub fn from_move(mv: Move) -> Self {
        Self::new((mv.board / 3) * 3 + mv.cell / 3, (mv.board % 3) * 3 + mv.cell % 3)
    }
}
