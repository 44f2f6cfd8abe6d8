pub mod board;
pub mod config;
pub mod error;
pub mod fen;
pub mod game;
pub mod moves;
pub mod piece;
pub mod strategy;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
