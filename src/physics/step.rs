//! Single-tick motion update.

use glam::DVec3;

use crate::config::SimulationConfig;
use crate::constants::terminal_speed;

/// Applies gravity then drag to `velocity` for one tick.
///
/// Vertical velocity follows `vy' = (vy + g) * vertical_drag`; horizontal
/// components only decay by the horizontal drag.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use softfall::config::SimulationConfig;
/// use softfall::physics::step_velocity;
///
/// let next = step_velocity(DVec3::ZERO, &SimulationConfig::default());
/// assert!((next.y + 0.0784).abs() < 1e-12);
/// ```
#[must_use]
pub fn step_velocity(velocity: DVec3, config: &SimulationConfig) -> DVec3 {
    DVec3::new(
        velocity.x * config.horizontal_drag,
        (velocity.y + config.gravity) * config.vertical_drag,
        velocity.z * config.horizontal_drag,
    )
}

/// Terminal downward speed for the configured gravity and drag.
#[must_use]
pub fn terminal_velocity(config: &SimulationConfig) -> f64 {
    terminal_speed(config.gravity, config.vertical_drag)
}

/// Whether every component of `velocity` is below `threshold` in magnitude.
#[must_use]
pub fn is_negligible(velocity: DVec3, threshold: f64) -> bool {
    velocity.abs().max_element() < threshold
}

/// Counts ticks until an entity falling from rest-relative `height` with
/// vertical velocity `vy` has descended that far.
///
/// Returns `None` when the drop is not reached within `max_ticks`, which
/// covers upward launches that never come back down in time.
#[must_use]
pub fn ticks_to_descend(height: f64, vy: f64, config: &SimulationConfig) -> Option<u32> {
    if !height.is_finite() || !vy.is_finite() {
        return None;
    }
    if height <= 0.0 {
        return Some(0);
    }
    let mut descended = 0.0;
    let mut velocity = vy;
    for tick in 1..=config.max_ticks {
        velocity = (velocity + config.gravity) * config.vertical_drag;
        descended -= velocity;
        if descended >= height {
            return Some(tick);
        }
    }
    None
}
