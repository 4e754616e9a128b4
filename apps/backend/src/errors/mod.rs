//! Error handling for the Lo Siento backend.

pub mod game;

pub use game::GameError;
