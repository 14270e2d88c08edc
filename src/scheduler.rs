//! Adaptive polling.
//!
//! One scheduler decides when the orchestrator's next tick is due. The host
//! asks [`PollScheduler::is_due`] from its own loop and runs the tick there,
//! so world and entity data are only ever read from a single context.

use std::time::Duration;

use log::trace;

use crate::config::PollingConfig;

/// Tracks when the next orchestrator tick should run.
#[derive(Debug, Clone, Default)]
pub struct PollScheduler {
    config: PollingConfig,
    next_due: Duration,
}

impl PollScheduler {
    /// Creates a scheduler whose first tick is due immediately.
    #[must_use]
    pub const fn new(config: PollingConfig) -> Self {
        Self {
            config,
            next_due: Duration::ZERO,
        }
    }

    /// Whether a poll is due at `now`.
    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_due
    }

    /// Clock time of the next poll.
    #[must_use]
    pub const fn next_due(&self) -> Duration {
        self.next_due
    }

    /// Polling interval for an entity moving down at `fall_speed`.
    ///
    /// Grounded entities poll at the idle rate whatever their speed.
    #[must_use]
    pub fn interval_for(&self, fall_speed: f64, airborne: bool) -> Duration {
        let ms = if !airborne {
            self.config.idle_ms
        } else if fall_speed >= self.config.fast_speed {
            self.config.fast_ms
        } else {
            self.config.normal_ms
        };
        Duration::from_millis(ms)
    }

    /// Schedules the next tick after one that ran at `now`, returning the
    /// interval chosen.
    pub fn reschedule(&mut self, now: Duration, fall_speed: f64, airborne: bool) -> Duration {
        let interval = self.interval_for(fall_speed, airborne);
        self.next_due = now.saturating_add(interval);
        trace!("next poll in {interval:?}");
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn scheduler() -> PollScheduler {
        PollScheduler::default()
    }

    #[rstest]
    #[case(0.0, false, 50)]
    #[case(3.0, false, 50)]
    #[case(0.2, true, 25)]
    #[case(1.49, true, 25)]
    #[case(1.5, true, 10)]
    #[case(3.9, true, 10)]
    fn interval_tracks_speed(
        scheduler: PollScheduler,
        #[case] speed: f64,
        #[case] airborne: bool,
        #[case] expected_ms: u64,
    ) {
        assert_eq!(
            scheduler.interval_for(speed, airborne),
            Duration::from_millis(expected_ms)
        );
    }

    #[rstest]
    fn reschedule_moves_the_deadline(mut scheduler: PollScheduler) {
        assert!(scheduler.is_due(Duration::ZERO));
        let now = Duration::from_millis(100);
        scheduler.reschedule(now, 2.0, true);
        assert!(!scheduler.is_due(Duration::from_millis(105)));
        assert!(scheduler.is_due(Duration::from_millis(110)));
    }
}
