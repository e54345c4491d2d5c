// src/types/score.rs
use serde::Serialize;

/// Normalized outcome of a successful submission. Percentages in [0, 100].
/// `technical` and `soft` are absent for contracts that only return a
/// final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub technical: Option<f64>,
    pub soft: Option<f64>,
    #[serde(rename = "final")]
    pub final_score: f64,
}

impl ScoreResult {
    pub fn with_breakdown(technical: f64, soft: f64, final_score: f64) -> Self {
        Self {
            technical: Some(technical),
            soft: Some(soft),
            final_score,
        }
    }

    pub fn final_only(final_score: f64) -> Self {
        Self {
            technical: None,
            soft: None,
            final_score,
        }
    }

    pub fn has_breakdown(&self) -> bool {
        self.technical.is_some() && self.soft.is_some()
    }
}
