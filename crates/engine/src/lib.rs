//! Engine module - the session that owns the game for the front end
//!
//! The front end never mutates a game directly. It hands intents (place a mark,
//! reset, switch mode, chat) to a [`Session`] and renders whatever
//! [`Session::displayed`] returns:
//!
//! - In **remote** play that is the authority's mirror, refreshed by the sync
//!   link (push, poll and move results all replace it wholesale)
//! - In **local** play that is a simulation the session owns, with the AI
//!   answering each human move after a short deliberation delay
//!
//! # Environment Variables
//!
//! - `STTT_MOVE_COOLDOWN_MS`: Spacing between remote human moves (default: 2000)
//! - `STTT_AI_DELAY_MIN_MS` / `STTT_AI_DELAY_MAX_MS`: AI delay bounds (default: 500 / 1500)
//! - `STTT_PREFS_PATH`: Preferred side file (default: ".super-ttt-side")

pub mod config;
pub mod prefs;
pub mod session;

pub use super_ttt_core as core;
pub use super_ttt_sync as sync;
pub use super_ttt_types as types;

pub use config::SessionConfig;
pub use prefs::SidePreference;
pub use session::{
    Connector, LocalGame, Mode, ModeKind, MoveOutcome, Notice, RemoteLink, Session, SessionStatus,
};
