//! Super Tic-Tac-Toe (workspace facade crate).
//!
//! Re-exports the workspace crates as `super_ttt::{core, sync, engine, term, input, types}`
//! so the binary, tests and benches share one import surface.

pub use super_ttt_core as core;
pub use super_ttt_engine as engine;
pub use super_ttt_input as input;
pub use super_ttt_sync as sync;
pub use super_ttt_term as term;
pub use super_ttt_types as types;
