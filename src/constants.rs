//! World physics and timing constants used across the prediction engine.
//!
//! The physics values describe the simulated world and are shared by the
//! trajectory simulator and the terminal velocity checks. Policy and
//! orchestrator constants seed the defaults of [`crate::config::Settings`].

/// Vertical acceleration per tick; negative pulls down.
pub const GRAVITY_ACCEL: f64 = -0.08;
/// Per-tick multiplier applied to vertical velocity after gravity.
pub const VERTICAL_DRAG: f64 = 0.98;
/// Per-tick multiplier applied to horizontal velocity while airborne.
pub const HORIZONTAL_DRAG: f64 = 0.91;
/// Magnitude of the fixed point of `v' = (v + g) * drag`.
pub const TERMINAL_VELOCITY: f64 = -(GRAVITY_ACCEL * VERTICAL_DRAG / (1.0 - VERTICAL_DRAG));
/// Per-axis speed below which motion is treated as settled.
pub const NEGLIGIBLE_MOTION: f64 = 0.003;
/// Hard ceiling on simulated ticks for a single sample point.
pub const MAX_SIMULATION_TICKS: u32 = 600;
/// Displacement from the origin beyond which a simulation gives up.
pub const MAX_SIMULATION_DISTANCE: f64 = 384.0;
/// Target spacing, in blocks, between swept collision samples.
pub const SWEEP_SPACING: f64 = 0.25;
/// Upper bound on intermediate sweep samples per tick.
pub const MAX_SWEEP_SAMPLES: u32 = 8;
/// Step ceiling for voxel ray traversal.
pub const MAX_RAYCAST_STEPS: u32 = 1024;

/// Act distance used when the entity is barely moving.
pub const BASE_ACT_DISTANCE: f64 = 5.0;
/// Extra act distance per block/tick of fall speed.
pub const VELOCITY_GAIN: f64 = 1.1;
/// Ceiling on the speed-scaled act distance.
pub const MAX_ACT_DISTANCE: f64 = 8.0;
/// Fewer estimated ticks than this marks a prediction as urgent.
pub const URGENT_TICKS: u32 = 8;
/// Threshold factor applied when impact is urgent.
pub const URGENT_MULTIPLIER: f64 = 1.2;
/// Threshold factor applied to urgent high-speed falls.
pub const EMERGENCY_MULTIPLIER: f64 = 1.5;
/// Fall speed above which the emergency window always applies.
pub const HIGH_SPEED_CUTOFF: f64 = 3.5;

/// Downward speed that opens a fall session.
pub const FALL_START_SPEED: f64 = 0.5;
/// Downward speed below which a tracked fall counts as stopped.
pub const FALL_CONTINUE_SPEED: f64 = 0.05;
/// Minimum gap between placement attempts.
pub const ATTEMPT_COOLDOWN_MS: u64 = 1000;
/// Safety valve for sessions stuck after a placement.
pub const PLACED_TIMEOUT_MS: u64 = 3000;
/// Cells scanned below the footprint when measuring height above ground.
pub const GROUND_SCAN_DEPTH: u32 = 48;
/// Fall distance beyond which a climbable lattice no longer absorbs impact.
pub const LATTICE_FALL_CAP: f64 = 150.0;

/// Polling interval for fast falls.
pub const FAST_POLL_MS: u64 = 10;
/// Polling interval while a fall is tracked.
pub const NORMAL_POLL_MS: u64 = 25;
/// Polling interval while idle.
pub const IDLE_POLL_MS: u64 = 50;
/// Fall speed at which polling switches to the fast interval.
pub const FAST_POLL_SPEED: f64 = 1.5;

/// Distance reported when a prediction has no target.
pub const NO_TARGET_DISTANCE: f64 = -1.0;
/// Inset applied to footprint corners so samples stay inside the box.
pub const FOOTPRINT_INSET: f64 = 1e-3;

/// Computes the terminal downward speed for the given gravity and drag.
///
/// # Examples
/// ```
/// use softfall::constants::terminal_speed;
/// assert!((terminal_speed(-0.08, 0.98) - 3.92).abs() < 1e-9);
/// ```
#[must_use]
pub fn terminal_speed(gravity: f64, drag: f64) -> f64 {
    (gravity * drag / (1.0 - drag)).abs()
}
