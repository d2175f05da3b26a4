//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework beyond `crossterm` key
//! events. It maps keys into [`UiCommand`]s and tracks the board [`Cursor`],
//! which turns a screen position into a `(board, cell)` move. [`ChatLine`]
//! composes chat text.

pub mod chat;
pub mod map;

pub use super_ttt_types as types;

pub use chat::{ChatEdit, ChatLine, MAX_CHAT_LEN};
pub use map::{handle_key_event, should_quit, Cursor, UiCommand};
