// src/types/response.rs
//! Wire shapes of the scoring service responses, one per contract variant.
//! Unknown fields are ignored; every listed field is required.

use serde::Deserialize;

/// `{technical_score, soft_score, final_score}` - job description backend.
#[derive(Debug, Deserialize)]
pub struct DescriptionScoreResponse {
    pub technical_score: f64,
    pub soft_score: f64,
    pub final_score: f64,
}

/// `{technical, soft, score}` - keyword backend with breakdown.
#[derive(Debug, Deserialize)]
pub struct KeywordBreakdownResponse {
    pub technical: f64,
    pub soft: f64,
    pub score: f64,
}

/// `{score}` - keyword backend returning only the final score.
#[derive(Debug, Deserialize)]
pub struct KeywordScoreResponse {
    pub score: ScalarScore,
}

/// The keyword backend formats its score as a string (`"72"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScalarScore {
    Number(f64),
    Text(String),
}
