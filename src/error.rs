// src/error.rs
//! Error taxonomy for a submission attempt.
//!
//! Every variant is caught at the controller boundary and turned into one
//! user-facing alert plus a log line; nothing here propagates past the shell.

use thiserror::Error;

pub const INVALID_FILE_ALERT: &str = "Please upload a valid PDF file.";
pub const GENERIC_FAILURE_ALERT: &str = "Something went wrong while analyzing your resume.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScanError {
    /// Missing file, wrong extension, unreadable file or a criteria field the
    /// active contract does not have. Raised before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure, timeout or non-2xx status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body does not satisfy the active contract.
    #[error("Contract error: {0}")]
    Contract(String),

    #[error("A submission is already in flight")]
    Busy,

    #[error("Submission cancelled by teardown")]
    Cancelled,
}

/// Coarse classification shown to the shell alongside the alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Transport,
    Contract,
    Busy,
    Cancelled,
}

impl ScanError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::Validation(_) => FailureKind::Validation,
            ScanError::Transport(_) => FailureKind::Transport,
            ScanError::Contract(_) => FailureKind::Contract,
            ScanError::Busy => FailureKind::Busy,
            ScanError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// The alert the user sees. Transport and contract failures share the
    /// same generic text; `Busy` and `Cancelled` are never alerted.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ScanError::Validation(_) => Some(INVALID_FILE_ALERT),
            ScanError::Transport(_) | ScanError::Contract(_) => Some(GENERIC_FAILURE_ALERT),
            ScanError::Busy | ScanError::Cancelled => None,
        }
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScanError::Transport(format!("request timed out: {}", err))
        } else {
            ScanError::Transport(err.to_string())
        }
    }
}
