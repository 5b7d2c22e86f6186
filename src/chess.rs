//! Implementation of chess rules: board state, move generation, special moves
//! and game termination.

pub mod board;
pub mod core;
pub mod game;
pub mod moves;
pub mod perft;
pub mod pieces;
pub mod position;
pub mod scanner;
pub mod selection;
pub mod state;
