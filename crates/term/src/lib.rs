//! Terminal rendering module.
//!
//! A small, game-oriented rendering layer: views draw into a plain
//! [`FrameBuffer`], and [`TerminalRenderer`] flushes it through `crossterm`.
//! Views are pure, so screens can be asserted on in unit tests.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use super_ttt_core as core;
pub use super_ttt_engine as engine;
pub use super_ttt_types as types;

pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use game_view::{cell_offset, status_lines, GameView, HudView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
