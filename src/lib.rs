// src/lib.rs
//! Résumé scoring client: collects a PDF résumé and job criteria, submits
//! them to a remote ATS scoring service and reveals the match score behind a
//! fixed-length "analyzing" phase.

pub mod cli;
pub mod contract;
pub mod controller;
pub mod core;
pub mod error;
pub mod input;
pub mod progress;
pub mod render;
pub mod types;

pub use contract::ContractVariant;
pub use controller::{FailureNotice, SubmissionController, SubmissionState};
pub use core::{ConfigManager, ScannerConfig, ScoringBackend, ServiceClient};
pub use error::{FailureKind, ScanError};
pub use input::{
    Criteria, CriteriaField, CriteriaShape, InputCollector, ResumeFile, SubmissionRequest,
};
pub use progress::{DecorativePhase, PhaseOutcome, Teardown};
pub use types::ScoreResult;
