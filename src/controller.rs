// src/controller.rs
//! Submission Controller - the single writer of the lifecycle state.
//!
//! `Idle -> Submitting -> AwaitingMinimumDisplay -> Complete`, or
//! `Idle -> Submitting -> Failed`. `Complete` and `Failed` accept a new
//! submit just like `Idle`. The network call and the decorative phase start
//! together; a result is published only once both are done, failures are
//! published as soon as they are known.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::core::service_client::ScoringBackend;
use crate::error::{FailureKind, ScanError};
use crate::input::{InputCollector, SubmissionRequest};
use crate::progress::{DecorativePhase, PhaseOutcome, Teardown};
use crate::types::ScoreResult;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    AwaitingMinimumDisplay,
    Complete(ScoreResult),
    Failed(FailureNotice),
}

impl SubmissionState {
    /// Whether the submit control is enabled.
    pub fn accepts_submit(&self) -> bool {
        !matches!(
            self,
            SubmissionState::Submitting | SubmissionState::AwaitingMinimumDisplay
        )
    }
}

/// What the shell shows after a failed submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub kind: FailureKind,
    pub message: &'static str,
    pub detail: String,
}

pub struct SubmissionController {
    backend: Arc<dyn ScoringBackend>,
    phase: DecorativePhase,
    state: watch::Sender<SubmissionState>,
    frames: watch::Sender<String>,
    teardown: Teardown,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn ScoringBackend>, phase: DecorativePhase) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        let (frames, _) = watch::channel(String::new());

        Self {
            backend,
            phase,
            state,
            frames,
            teardown: Teardown::new(),
        }
    }

    /// Read side of the lifecycle state, for the renderer.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Reveal frames of the decorative status line.
    pub fn status_frames(&self) -> watch::Receiver<String> {
        self.frames.subscribe()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn can_submit(&self) -> bool {
        !self.teardown.is_triggered() && self.state.borrow().accepts_submit()
    }

    /// The consuming view is gone: stop the decorative phase and never
    /// publish another transition.
    pub fn teardown(&self) {
        self.teardown.trigger();
    }

    /// One user submit action. At most one request is ever in flight; a
    /// submit while busy returns `Busy` without touching anything. Input is
    /// only borrowed, so a failed attempt leaves it intact for a retry.
    pub async fn submit(&self, input: &InputCollector) -> Result<ScoreResult, ScanError> {
        if self.teardown.is_triggered() {
            return Err(ScanError::Cancelled);
        }
        if !self.state.borrow().accepts_submit() {
            debug!("Submit ignored: a submission is already in flight");
            return Err(ScanError::Busy);
        }

        let request = match input.build_request() {
            Ok(request) => request,
            Err(e) => {
                warn!("Submission rejected before sending: {}", e);
                return Err(e);
            }
        };
        if let Err(e) = request.file().ensure_readable().await {
            warn!("Submission rejected before sending: {}", e);
            return Err(e);
        }

        let claimed = self.state.send_if_modified(|state| {
            if state.accepts_submit() {
                *state = SubmissionState::Submitting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ScanError::Busy);
        }

        let span = info_span!("submission", id = %request.id());
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: SubmissionRequest) -> Result<ScoreResult, ScanError> {
        info!("Submitting {}", request.file().name());
        self.frames.send_replace(String::new());

        let network = self.backend.score(&request);
        let phase = self.phase.run(&self.teardown, &self.frames);
        tokio::pin!(network, phase);

        let mut phase_outcome = None;
        let response = loop {
            tokio::select! {
                biased;
                _ = self.teardown.triggered() => {
                    info!("Torn down while awaiting the scoring service");
                    return Err(ScanError::Cancelled);
                }
                response = &mut network => break response,
                outcome = &mut phase, if phase_outcome.is_none() => {
                    phase_outcome = Some(outcome);
                }
            }
        };

        let result = match response {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e)),
        };

        self.state.send_replace(SubmissionState::AwaitingMinimumDisplay);
        let outcome = match phase_outcome {
            Some(outcome) => outcome,
            None => phase.await,
        };

        if outcome == PhaseOutcome::Cancelled || self.teardown.is_triggered() {
            info!("Torn down before the result was revealed");
            return Err(ScanError::Cancelled);
        }

        info!("Analysis complete: {}% match", result.final_score);
        self.state.send_replace(SubmissionState::Complete(result));
        Ok(result)
    }

    fn fail(&self, err: ScanError) -> ScanError {
        error!("Submission failed: {}", err);
        let notice = FailureNotice {
            kind: err.kind(),
            message: err.user_message().unwrap_or_default(),
            detail: err.to_string(),
        };
        self.state.send_replace(SubmissionState::Failed(notice));
        err
    }
}

impl Drop for SubmissionController {
    fn drop(&mut self) {
        self.teardown.trigger();
    }
}
