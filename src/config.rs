//! Layered runtime settings.
//!
//! Defaults come from [`crate::constants`]; an optional TOML file and
//! `SOFTFALL_`-prefixed environment variables override them, in that order.
//! Nested keys use `__` in the environment, so
//! `SOFTFALL_POLICY__BASE_ACT_DISTANCE=4.5` sets `policy.base_act_distance`.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::countermeasure::Countermeasure;
use crate::error::ConfigError;
use crate::world::BlockKind;
use crate::{
    ATTEMPT_COOLDOWN_MS, BASE_ACT_DISTANCE, EMERGENCY_MULTIPLIER, FALL_CONTINUE_SPEED,
    FALL_START_SPEED, FAST_POLL_MS, FAST_POLL_SPEED, GRAVITY_ACCEL, GROUND_SCAN_DEPTH,
    HIGH_SPEED_CUTOFF, HORIZONTAL_DRAG, IDLE_POLL_MS, LATTICE_FALL_CAP, MAX_ACT_DISTANCE,
    MAX_SIMULATION_DISTANCE, MAX_SIMULATION_TICKS, MAX_SWEEP_SAMPLES, NEGLIGIBLE_MOTION,
    NORMAL_POLL_MS, PLACED_TIMEOUT_MS, SWEEP_SPACING, URGENT_MULTIPLIER, URGENT_TICKS,
    VELOCITY_GAIN, VERTICAL_DRAG,
};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SOFTFALL_";

/// Trajectory simulator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Vertical acceleration per tick; negative pulls down.
    pub gravity: f64,
    /// Vertical velocity multiplier applied each tick.
    pub vertical_drag: f64,
    /// Horizontal velocity multiplier applied each tick.
    pub horizontal_drag: f64,
    /// Speeds below this are snapped to zero.
    pub negligible_motion: f64,
    /// Simulation step limit.
    pub max_ticks: u32,
    /// Distance from the origin after which the simulation gives up.
    pub max_distance: f64,
    /// Target spacing between swept collision samples.
    pub sweep_spacing: f64,
    /// Cap on swept samples per tick.
    pub max_sweep_samples: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_ACCEL,
            vertical_drag: VERTICAL_DRAG,
            horizontal_drag: HORIZONTAL_DRAG,
            negligible_motion: NEGLIGIBLE_MOTION,
            max_ticks: MAX_SIMULATION_TICKS,
            max_distance: MAX_SIMULATION_DISTANCE,
            sweep_spacing: SWEEP_SPACING,
            max_sweep_samples: MAX_SWEEP_SAMPLES,
        }
    }
}

/// Timing/distance policy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Act distance at zero fall speed.
    pub base_act_distance: f64,
    /// Extra act distance per block/tick of fall speed.
    pub velocity_gain: f64,
    /// Ceiling on the speed-scaled act distance.
    pub max_act_distance: f64,
    /// Ticks to impact below which a decision is urgent.
    pub urgent_ticks: u32,
    /// Threshold factor for urgent decisions.
    pub urgent_multiplier: f64,
    /// Threshold factor for urgent high-speed falls.
    pub emergency_multiplier: f64,
    /// Fall speed that always counts as an emergency.
    pub high_speed_cutoff: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            base_act_distance: BASE_ACT_DISTANCE,
            velocity_gain: VELOCITY_GAIN,
            max_act_distance: MAX_ACT_DISTANCE,
            urgent_ticks: URGENT_TICKS,
            urgent_multiplier: URGENT_MULTIPLIER,
            emergency_multiplier: EMERGENCY_MULTIPLIER,
            high_speed_cutoff: HIGH_SPEED_CUTOFF,
        }
    }
}

/// Safety classifier parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Fall distance at or beyond which a climbable lattice stops helping.
    pub lattice_fall_cap: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            lattice_fall_cap: LATTICE_FALL_CAP,
        }
    }
}

/// State machine thresholds and countermeasure preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Downward speed that opens a session.
    pub fall_start_speed: f64,
    /// Downward speed below which a tracked fall has stopped.
    pub fall_continue_speed: f64,
    /// Minimum gap between placement attempts.
    pub attempt_cooldown_ms: u64,
    /// Session timeout once a countermeasure is placed.
    pub placed_timeout_ms: u64,
    /// Cells scanned below the footprint for height above ground.
    pub ground_scan_depth: u32,
    /// Pick placed water back up once the entity has landed in it.
    pub recover_water: bool,
    /// Countermeasures the orchestrator may choose from.
    pub countermeasures: Vec<Countermeasure>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fall_start_speed: FALL_START_SPEED,
            fall_continue_speed: FALL_CONTINUE_SPEED,
            attempt_cooldown_ms: ATTEMPT_COOLDOWN_MS,
            placed_timeout_ms: PLACED_TIMEOUT_MS,
            ground_scan_depth: GROUND_SCAN_DEPTH,
            recover_water: true,
            countermeasures: vec![
                Countermeasure::Water,
                Countermeasure::Block(BlockKind::SlimeBlock),
                Countermeasure::Block(BlockKind::HayBale),
                Countermeasure::Block(BlockKind::Cobweb),
            ],
        }
    }
}

/// Adaptive polling intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval for fast falls.
    pub fast_ms: u64,
    /// Interval while a fall is tracked.
    pub normal_ms: u64,
    /// Interval while idle.
    pub idle_ms: u64,
    /// Fall speed at which the fast interval applies.
    pub fast_speed: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fast_ms: FAST_POLL_MS,
            normal_ms: NORMAL_POLL_MS,
            idle_ms: IDLE_POLL_MS,
            fast_speed: FAST_POLL_SPEED,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Trajectory simulator.
    pub simulation: SimulationConfig,
    /// Act distance and urgency.
    pub policy: PolicyConfig,
    /// Landing classification.
    pub safety: SafetyConfig,
    /// State machine.
    pub orchestrator: OrchestratorConfig,
    /// Polling cadence.
    pub polling: PollingConfig,
}

impl Settings {
    /// Builds the provider stack: defaults, then `path` if given, then the
    /// environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = path {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates settings from the full provider stack.
    ///
    /// # Errors
    /// Returns [`ConfigError::Load`] when a provider yields malformed data and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings: Self = Self::figment(path).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from TOML text layered over the defaults.
    ///
    /// The environment is not consulted.
    ///
    /// # Examples
    /// ```
    /// use softfall::config::Settings;
    /// let settings = Settings::from_toml_str("[policy]\nbase_act_distance = 4.0\n").unwrap();
    /// assert!((settings.policy.base_act_distance - 4.0).abs() < f64::EPSILON);
    /// assert_eq!(settings.simulation, Default::default());
    /// ```
    ///
    /// # Errors
    /// As for [`Settings::load`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(text))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every value for physical plausibility.
    ///
    /// # Errors
    /// Returns the first [`ConfigError::Invalid`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(sim.gravity.is_finite() && sim.gravity < 0.0) {
            return Err(ConfigError::invalid(
                "simulation.gravity",
                format!("must be finite and negative, got {}", sim.gravity),
            ));
        }
        check_drag("simulation.vertical_drag", sim.vertical_drag)?;
        check_drag("simulation.horizontal_drag", sim.horizontal_drag)?;
        check_positive("simulation.negligible_motion", sim.negligible_motion)?;
        check_positive("simulation.max_distance", sim.max_distance)?;
        check_positive("simulation.sweep_spacing", sim.sweep_spacing)?;
        if sim.max_ticks == 0 {
            return Err(ConfigError::invalid("simulation.max_ticks", "must be non-zero"));
        }
        if sim.max_sweep_samples == 0 {
            return Err(ConfigError::invalid(
                "simulation.max_sweep_samples",
                "must be non-zero",
            ));
        }

        let policy = &self.policy;
        check_positive("policy.base_act_distance", policy.base_act_distance)?;
        check_non_negative("policy.velocity_gain", policy.velocity_gain)?;
        if !(policy.max_act_distance.is_finite()
            && policy.max_act_distance >= policy.base_act_distance)
        {
            return Err(ConfigError::invalid(
                "policy.max_act_distance",
                format!(
                    "must be at least base_act_distance ({}), got {}",
                    policy.base_act_distance, policy.max_act_distance
                ),
            ));
        }
        check_multiplier("policy.urgent_multiplier", policy.urgent_multiplier)?;
        check_multiplier("policy.emergency_multiplier", policy.emergency_multiplier)?;
        check_positive("policy.high_speed_cutoff", policy.high_speed_cutoff)?;

        check_positive("safety.lattice_fall_cap", self.safety.lattice_fall_cap)?;

        let orch = &self.orchestrator;
        check_positive("orchestrator.fall_start_speed", orch.fall_start_speed)?;
        check_non_negative("orchestrator.fall_continue_speed", orch.fall_continue_speed)?;
        if orch.fall_continue_speed > orch.fall_start_speed {
            return Err(ConfigError::invalid(
                "orchestrator.fall_continue_speed",
                "must not exceed fall_start_speed",
            ));
        }
        if orch.ground_scan_depth == 0 {
            return Err(ConfigError::invalid(
                "orchestrator.ground_scan_depth",
                "must be non-zero",
            ));
        }

        let polling = &self.polling;
        if polling.fast_ms == 0 || polling.fast_ms > polling.normal_ms {
            return Err(ConfigError::invalid(
                "polling.fast_ms",
                "must be non-zero and no longer than normal_ms",
            ));
        }
        if polling.normal_ms > polling.idle_ms {
            return Err(ConfigError::invalid(
                "polling.normal_ms",
                "must be no longer than idle_ms",
            ));
        }
        check_positive("polling.fast_speed", polling.fast_speed)
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

fn check_drag(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must lie strictly between 0 and 1, got {value}"),
        ))
    }
}

fn check_multiplier(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be finite and at least 1, got {value}"),
        ))
    }
}
