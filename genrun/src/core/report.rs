//! Aggregate record of a generation run.
//!
//! Built up by the orchestrator's own control flow and returned from the run
//! call, rather than accumulated in mutable state captured by a traversal
//! callback. The overall result is computed from the recorded outcomes, so
//! it cannot disagree with them.

use std::time::Duration;

use serde::Serialize;

use crate::core::outcome::FileOutcome;
use crate::core::path_map::SourceEntry;

/// Run-level verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Success,
    Failure,
}

/// Outcomes and summary counters for one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Wall-clock start of the run (RFC 3339).
    pub started_at: String,
    /// Elapsed duration of the run.
    #[serde(serialize_with = "serialize_duration_secs")]
    pub elapsed: Duration,
    /// Per-file outcomes in the order they were recorded. Marker files never
    /// appear here.
    pub outcomes: Vec<(SourceEntry, FileOutcome)>,
    /// True when an unexpected failure halted the scan before exhaustion.
    pub aborted: bool,
}

impl RunReport {
    pub fn new(started_at: String) -> Self {
        Self {
            started_at,
            elapsed: Duration::ZERO,
            outcomes: Vec::new(),
            aborted: false,
        }
    }

    /// Append one file outcome.
    pub fn record(&mut self, entry: SourceEntry, outcome: FileOutcome) {
        self.outcomes.push((entry, outcome));
    }

    /// Number of files attempted (mapped and recorded).
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of files that transformed successfully.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .count()
    }

    /// Failure iff any recorded outcome is not Success. Independent of
    /// whether publishing ran.
    pub fn overall_result(&self) -> RunResult {
        if self.outcomes.iter().all(|(_, outcome)| outcome.is_success()) {
            RunResult::Success
        } else {
            RunResult::Failure
        }
    }
}

fn serialize_duration_secs<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
