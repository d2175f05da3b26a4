//! Sync module - the client side of the authority protocol
//!
//! In multiplayer the authority owns the game; this crate keeps a local mirror of
//! it up to date and forwards the player's moves. The protocol is
//! **line-delimited JSON over TCP**.
//!
//! # Feeds
//!
//! The mirror is refreshed from three places, all of which replace it wholesale:
//!
//! 1. **Snapshot**: fetched once when a link opens, then on every poll tick
//! 2. **Push**: `game_update` broadcast by the authority after any change
//! 3. **Move result**: the game returned with a successful `move_result`
//!
//! Pushes are treated as a latency optimisation; polling alone keeps the mirror
//! correct. Payloads that do not decode into a valid game are logged and dropped,
//! keeping the last good mirror.
//!
//! # Message Types
//!
//! ## Client → Authority
//!
//! - **move**: `{"type":"move","seq":1,"team":"X","board":4,"cell":0}`
//! - **snapshot**: `{"type":"snapshot","seq":2}`
//! - **reset**: `{"type":"reset","seq":3}`
//! - **chat_message**: `{"type":"chat_message","seq":4,"username":"X","message":"gg"}`
//!
//! ## Authority → Client
//!
//! - **move_result**, **snapshot**, **reset_result**: responses echoing `seq`
//! - **game_update**, **chat_message**: pushes without `seq`
//!
//! # Environment Variables
//!
//! - `STTT_AUTHORITY_HOST`: Authority address (default: "127.0.0.1")
//! - `STTT_AUTHORITY_PORT`: Port number (default: 5000)
//! - `STTT_POLL_MS`: Snapshot poll period (default: 2000)
//! - `STTT_REQUEST_TIMEOUT_MS`: Connect and response timeout (default: 3000)
//!
//! # Testing
//!
//! ```bash
//! nc -l 5000
//! {"type":"snapshot","seq":1,"game":{"boards":[...],"boardWinners":[...],"nextBoard":-1,"winner":"","gameOver":false}}
//! ```

pub mod error;
pub mod link;
pub mod protocol;
pub mod runtime;

pub use super_ttt_core as core;
pub use super_ttt_types as types;

pub use error::SyncError;
pub use link::{
    link_pair, run_link, LinkConfig, LinkHandle, LinkPeer, MirrorSource, SyncCommand, SyncEvent,
};
pub use protocol::*;
pub use runtime::SyncRuntime;
