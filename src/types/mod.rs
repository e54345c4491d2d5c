// src/types/mod.rs
pub mod response;
pub mod score;

pub use score::ScoreResult;
