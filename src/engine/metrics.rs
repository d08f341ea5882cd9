//! Per-stage timings for one analysis.
//!
//! Collected on every run (a handful of `Instant::now()` calls) and surfaced
//! by [`crate::analyze_message_verbose`]. Stages that did not run stay at
//! zero.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageMetrics {
    /// Total elapsed time for the analysis.
    pub total: Duration,
    /// Start-term lookup and sentence isolation.
    pub start_term: Duration,
    pub counter: Duration,
    pub magic_bullet: Duration,
    pub general: Duration,
}

impl StageMetrics {
    /// Sum of the individual stages; at most [`StageMetrics::total`].
    pub fn stages(&self) -> Duration {
        self.start_term + self.counter + self.magic_bullet + self.general
    }
}
