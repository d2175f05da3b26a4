//! Single-line chat composer.
//!
//! While a line is being composed every key belongs to it, so letters that are
//! bindings elsewhere (`q`, `r`, ...) are typed rather than acted on.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Longest line the composer accepts, in characters.
pub const MAX_CHAT_LEN: usize = 200;

/// What a key did to the line being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEdit {
    /// Still composing.
    Editing,
    /// Enter pressed with this text.
    Send(String),
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLine {
    text: String,
}

impl ChatLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ChatEdit {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => ChatEdit::Cancel,
                _ => ChatEdit::Editing,
            };
        }
        match key.code {
            KeyCode::Esc => ChatEdit::Cancel,
            KeyCode::Enter => ChatEdit::Send(std::mem::take(&mut self.text)),
            KeyCode::Backspace => {
                self.text.pop();
                ChatEdit::Editing
            }
            KeyCode::Char(c) => {
                if self.text.chars().count() < MAX_CHAT_LEN {
                    self.text.push(c);
                }
                ChatEdit::Editing
            }
            _ => ChatEdit::Editing,
        }
    }
}
