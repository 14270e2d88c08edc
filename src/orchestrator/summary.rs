//! End-of-session reporting and running counters.

use std::time::Duration;

use serde::Serialize;

use crate::countermeasure::Countermeasure;

/// How a fall session concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallOutcome {
    /// A countermeasure was placed and the entity landed.
    Protected,
    /// The executor reported failure or nothing could be placed.
    PlacementFailed,
    /// The landing was never observed before the placed timeout.
    TimedOut,
    /// The fall ended before the orchestrator acted.
    EndedBeforeAction,
}

/// Report passed to listeners when a session finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Height lost between detection and the end of the session.
    pub fall_distance: f64,
    /// Time from detection to the end of the session.
    pub duration: Duration,
    /// How the session finished.
    pub outcome: FallOutcome,
    /// Countermeasure used, if any.
    pub countermeasure: Option<Countermeasure>,
}

/// Counters accumulated over the orchestrator's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrchestratorStats {
    /// Distinct falls detected.
    pub falls_detected: u64,
    /// Placement attempts.
    pub attempts: u64,
    /// Attempts that placed something.
    pub successes: u64,
    /// Attempts that failed.
    pub failures: u64,
    /// Sessions that reached `FALL_ENDED`.
    pub sessions_completed: u64,
    /// Listener callbacks that returned an error or panicked.
    pub listener_faults: u64,
}
