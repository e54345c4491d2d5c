// src/progress.rs
//! Decorative "analyzing" phase and the teardown token that cancels it.
//!
//! The phase reveals a status line one character per cadence tick, holds the
//! full line, then finishes. Its length never depends on network latency.

use std::iter;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::core::config_manager::AnimationConfig;

/// Signalled once when the consuming view goes away. Cheap to clone; all
/// clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Teardown {
    tx: Arc<watch::Sender<bool>>,
}

impl Teardown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `trigger` has been called.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|torn_down| *torn_down).await;
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Finished,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct DecorativePhase {
    text: String,
    cadence: Duration,
    hold: Duration,
    cap: Duration,
}

impl DecorativePhase {
    pub fn new(text: impl Into<String>, cadence: Duration, hold: Duration, cap: Duration) -> Self {
        Self {
            text: text.into(),
            cadence,
            hold,
            cap,
        }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(
            config.status_text.clone(),
            Duration::from_millis(config.cadence_ms),
            Duration::from_millis(config.hold_ms),
            Duration::from_millis(config.cap_ms),
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `cadence × (chars + 1) + hold`, never more than the cap.
    pub fn total_duration(&self) -> Duration {
        let ticks = self.text.chars().count() as u32 + 1;
        (self.cadence * ticks + self.hold).min(self.cap)
    }

    /// Publishes each reveal frame on `frames`. Returns `Cancelled` as soon as
    /// `teardown` fires; nothing is published after that.
    pub async fn run(&self, teardown: &Teardown, frames: &watch::Sender<String>) -> PhaseOutcome {
        let deadline = Instant::now() + self.total_duration();

        let sequence = async {
            let boundaries = self
                .text
                .char_indices()
                .map(|(i, _)| i)
                .chain(iter::once(self.text.len()));

            for end in boundaries {
                tokio::time::sleep(self.cadence).await;
                frames.send_replace(self.text[..end].to_string());
            }
            tokio::time::sleep(self.hold).await;
        };

        tokio::select! {
            biased;
            _ = teardown.triggered() => {
                debug!("Decorative phase cancelled by teardown");
                PhaseOutcome::Cancelled
            }
            _ = tokio::time::timeout_at(deadline, sequence) => PhaseOutcome::Finished,
        }
    }
}

impl Default for DecorativePhase {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}
