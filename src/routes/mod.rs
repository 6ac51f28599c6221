//! HTML fragment handlers called through `handle_request`.

pub mod board;
pub mod game;
pub mod roster;
pub mod score;
pub mod state;
pub mod util;
