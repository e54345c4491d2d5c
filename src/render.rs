// src/render.rs
//! Text rendering of the result panel and failure alerts.

use std::fmt::Write;

use crate::controller::FailureNotice;
use crate::types::ScoreResult;

const TIPS: [&str; 3] = [
    "Include more relevant keywords from the job description.",
    "Use clear, action-based language and metrics.",
    "Tailor your resume per job application.",
];

/// Whole-number percentage, e.g. `72%`. Halves round up.
pub fn percent(value: f64) -> String {
    format!("{}%", value.round())
}

pub fn render_result(result: &ScoreResult) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "✅ Analysis Complete: {} Match",
        percent(result.final_score)
    );

    if let (Some(technical), Some(soft)) = (result.technical, result.soft) {
        let _ = writeln!(out);
        let _ = writeln!(out, "📊 Score Breakdown");
        let _ = writeln!(out, "  • Technical: {}", percent(technical));
        let _ = writeln!(out, "  • Soft: {}", percent(soft));
        let _ = writeln!(out, "  • The final score balances both skill types.");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "🔍 Tips to Improve");
    for tip in TIPS {
        let _ = writeln!(out, "  • {}", tip);
    }

    let _ = writeln!(out);
    let _ = write!(out, "This analysis is a guideline. Real ATS systems may vary.");
    out
}

pub fn render_failure(notice: &FailureNotice) -> String {
    format!("❌ {}", notice.message)
}
