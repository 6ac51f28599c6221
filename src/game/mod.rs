//! Game state module — roster, scoring transitions, derived leaderboard and
//! localStorage persistence. The session lives in WASM memory (thread_local)
//! for the lifetime of the Web Worker.

pub mod avatar;
pub mod leaderboard;
pub mod overlay;
pub mod player;
pub mod session;
pub mod state;
pub mod storage;
