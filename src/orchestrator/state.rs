//! Lifecycle states and the per-fall session record.

use std::fmt;
use std::time::Duration;

use glam::DVec3;
use serde::Serialize;

use crate::countermeasure::Countermeasure;
use crate::geometry::BlockPos;
use crate::prediction::Prediction;

/// Orchestrator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallState {
    /// No fall in progress.
    #[default]
    Idle,
    /// A fall has just started.
    FallDetected,
    /// Following a fall that may need help.
    TrackingFall,
    /// The countermeasure is about to be placed.
    ReadyToPlace,
    /// A countermeasure was placed.
    WaterPlaced,
    /// The session is finishing.
    FallEnded,
}

impl FallState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::FallDetected,
        Self::TrackingFall,
        Self::ReadyToPlace,
        Self::WaterPlaced,
        Self::FallEnded,
    ];

    /// Upper-case name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::FallDetected => "FALL_DETECTED",
            Self::TrackingFall => "TRACKING_FALL",
            Self::ReadyToPlace => "READY_TO_PLACE",
            Self::WaterPlaced => "WATER_PLACED",
            Self::FallEnded => "FALL_ENDED",
        }
    }

    /// Whether a fall session exists in this state.
    #[must_use]
    pub const fn in_session(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for FallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of the single in-flight fall.
///
/// Created on detection and dropped on the return to [`FallState::Idle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(super) start_position: DVec3,
    pub(super) start_time: Duration,
    pub(super) prediction: Option<Prediction>,
    pub(super) attempted: bool,
    pub(super) attempted_at: Option<Duration>,
    pub(super) countermeasure: Option<Countermeasure>,
    pub(super) placed_at: Option<BlockPos>,
    pub(super) placement_succeeded: bool,
    pub(super) timed_out: bool,
    /// Detected again after the same airborne stretch was judged safe.
    pub(super) redetected: bool,
}

impl Session {
    pub(super) const fn new(start_position: DVec3, start_time: Duration) -> Self {
        Self {
            start_position,
            start_time,
            prediction: None,
            attempted: false,
            attempted_at: None,
            countermeasure: None,
            placed_at: None,
            placement_succeeded: false,
            timed_out: false,
            redetected: false,
        }
    }

    /// Feet position when the fall was detected.
    #[must_use]
    pub const fn start_position(&self) -> DVec3 {
        self.start_position
    }

    /// Clock time when the fall was detected.
    #[must_use]
    pub const fn start_time(&self) -> Duration {
        self.start_time
    }

    /// Latest prediction, replaced on every analysis.
    #[must_use]
    pub const fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    /// Whether the placement attempt has been made this session.
    #[must_use]
    pub const fn attempted(&self) -> bool {
        self.attempted
    }

    /// Countermeasure chosen for this session.
    #[must_use]
    pub const fn countermeasure(&self) -> Option<Countermeasure> {
        self.countermeasure
    }

    /// Cell the countermeasure was placed into.
    #[must_use]
    pub const fn placed_at(&self) -> Option<BlockPos> {
        self.placed_at
    }

    /// Whether the placement reported success.
    #[must_use]
    pub const fn placement_succeeded(&self) -> bool {
        self.placement_succeeded
    }

    /// Whether the session ended on the placed timeout.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Time of the placement attempt, if one was made.
    #[must_use]
    pub const fn attempted_at(&self) -> Option<Duration> {
        self.attempted_at
    }
}
