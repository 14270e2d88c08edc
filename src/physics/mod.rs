//! Discrete-time physics for trajectory projection.
//!
//! [`step_velocity`] advances velocity by one tick of gravity and drag and
//! [`TrajectorySimulator`] repeats it until the moving point meets solid
//! geometry or a bound is reached. Both are pure and bounded.

mod simulate;
mod step;

pub use simulate::{SimulationResult, Termination, TrajectorySimulator, TrajectoryStep};
pub use step::{is_negligible, step_velocity, terminal_velocity, ticks_to_descend};
