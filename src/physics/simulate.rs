//! Tick-stepped trajectory projection with swept collision checks.

use glam::DVec3;
use log::debug;
use serde::Serialize;

use super::step::{is_negligible, step_velocity};
use crate::config::SimulationConfig;
use crate::geometry::BlockPos;
use crate::numeric::ceil_to_u32;

/// One simulated tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryStep {
    /// Tick index; `0` is the initial state.
    pub tick: u32,
    /// Feet position after the tick.
    pub position: DVec3,
    /// Velocity after the tick.
    pub velocity: DVec3,
    /// Whether this step hit a block.
    pub collided: bool,
    /// Block hit, when `collided`.
    pub collided_block: Option<BlockPos>,
}

/// Why a simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The collision predicate reported a hit.
    Impact,
    /// Motion on every axis fell below the negligible threshold.
    Settled,
    /// Displacement from the origin exceeded the distance bound.
    OutOfRange,
    /// The tick ceiling was reached.
    TickLimit,
    /// The origin or velocity was not finite.
    InvalidInput,
}

/// Full history of one simulated trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    steps: Vec<TrajectoryStep>,
    termination: Termination,
}

impl SimulationResult {
    /// Steps in tick order, starting with the initial state.
    #[must_use]
    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    /// The step at which the collision was detected.
    #[must_use]
    pub fn impact(&self) -> Option<&TrajectoryStep> {
        if self.found_impact() {
            self.steps.last()
        } else {
            None
        }
    }

    /// Whether the run ended on a collision.
    #[must_use]
    pub fn found_impact(&self) -> bool {
        self.termination == Termination::Impact
    }

    /// Why the run stopped.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    /// Ticks from the initial state to the impact step.
    #[must_use]
    pub fn ticks_to_impact(&self) -> Option<u32> {
        self.impact().map(|step| step.tick)
    }
}

/// Projects trajectories using the world's gravity and drag.
#[derive(Debug, Clone, Default)]
pub struct TrajectorySimulator {
    config: SimulationConfig,
}

impl TrajectorySimulator {
    /// Simulator using `config`.
    #[must_use]
    pub const fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Active parameters.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Steps physics from `origin` until `collides` reports a hit or a bound
    /// is reached.
    ///
    /// `collides(from, to)` receives consecutive sweep points between the
    /// previous and new position of each tick and returns the block hit on
    /// that sub-segment, if any.
    ///
    /// # Examples
    /// ```
    /// use glam::DVec3;
    /// use softfall::physics::TrajectorySimulator;
    /// use softfall::BlockPos;
    ///
    /// let simulator = TrajectorySimulator::default();
    /// let result = simulator.simulate(DVec3::new(0.5, 70.0, 0.5), DVec3::ZERO, |_, to| {
    ///     (to.y < 64.0).then(|| BlockPos::new(0, 63, 0))
    /// });
    /// assert!(result.found_impact());
    /// assert_eq!(result.impact().and_then(|s| s.collided_block), Some(BlockPos::new(0, 63, 0)));
    /// ```
    pub fn simulate<F>(&self, origin: DVec3, velocity: DVec3, mut collides: F) -> SimulationResult
    where
        F: FnMut(DVec3, DVec3) -> Option<BlockPos>,
    {
        let initial = TrajectoryStep {
            tick: 0,
            position: origin,
            velocity,
            collided: false,
            collided_block: None,
        };
        let mut steps = vec![initial];

        if !origin.is_finite() || !velocity.is_finite() {
            return SimulationResult {
                steps,
                termination: Termination::InvalidInput,
            };
        }

        let mut position = origin;
        let mut current = velocity;

        for tick in 1..=self.config.max_ticks {
            current = step_velocity(current, &self.config);
            let next = position + current;

            if let Some((hit_at, block)) = self.sweep(position, next, &mut collides) {
                steps.push(TrajectoryStep {
                    tick,
                    position: hit_at,
                    velocity: current,
                    collided: true,
                    collided_block: Some(block),
                });
                return SimulationResult {
                    steps,
                    termination: Termination::Impact,
                };
            }

            position = next;
            steps.push(TrajectoryStep {
                tick,
                position,
                velocity: current,
                collided: false,
                collided_block: None,
            });

            if is_negligible(current, self.config.negligible_motion) {
                return SimulationResult {
                    steps,
                    termination: Termination::Settled,
                };
            }
            if position.distance(origin) > self.config.max_distance {
                return SimulationResult {
                    steps,
                    termination: Termination::OutOfRange,
                };
            }
        }

        debug!(
            "trajectory from {origin:?} hit the {} tick ceiling",
            self.config.max_ticks
        );
        SimulationResult {
            steps,
            termination: Termination::TickLimit,
        }
    }

    /// Number of sweep samples for a tick covering `distance` blocks.
    #[must_use]
    pub fn sweep_samples(&self, distance: f64) -> u32 {
        ceil_to_u32(distance / self.config.sweep_spacing)
            .min(self.config.max_sweep_samples)
            .max(1)
    }

    fn sweep<F>(&self, from: DVec3, to: DVec3, collides: &mut F) -> Option<(DVec3, BlockPos)>
    where
        F: FnMut(DVec3, DVec3) -> Option<BlockPos>,
    {
        let samples = self.sweep_samples(from.distance(to));
        let count = f64::from(samples);
        let mut previous = from;
        for i in 1..=samples {
            let point = from.lerp(to, f64::from(i) / count);
            if let Some(block) = collides(previous, point) {
                return Some((contact_point(previous, point, block), block));
            }
            previous = point;
        }
        None
    }
}

/// Where a sub-segment meets `block`: its top face when descending onto it,
/// otherwise the sub-segment's end.
fn contact_point(from: DVec3, to: DVec3, block: BlockPos) -> DVec3 {
    let top = block.top();
    if from.y >= top && to.y < top {
        let span = from.y - to.y;
        let t = if span > 0.0 { (from.y - top) / span } else { 1.0 };
        from.lerp(to, t)
    } else {
        to
    }
}
