//! Timing/distance policy: act now or keep waiting.
//!
//! The act distance grows with fall speed up to a ceiling and widens again
//! when impact is only a few ticks away. Three disjuncts trigger action:
//!
//! 1. the target is within the act distance;
//! 2. impact is urgent and the target is within the emergency window;
//! 3. the entity is near terminal speed and within the emergency window.
//!
//! Distance alone under-reacts to acceleration near terminal speed, which is
//! what the last two cover.

use serde::Serialize;

use crate::config::PolicyConfig;

/// Result of [`TimingPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingDecision {
    /// Whether to place now.
    pub should_act: bool,
    /// Act distance after urgency scaling.
    pub threshold: f64,
    /// Whether impact is close in ticks.
    pub urgent: bool,
    /// Human-readable justification.
    pub reason: String,
}

/// Stateless decision rule parameterised by [`PolicyConfig`].
#[derive(Debug, Clone, Default)]
pub struct TimingPolicy {
    config: PolicyConfig,
}

impl TimingPolicy {
    /// Policy using `config`.
    #[must_use]
    pub const fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Active parameters.
    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Speed-scaled act distance before any urgency adjustment.
    ///
    /// # Examples
    /// ```
    /// use softfall::policy::TimingPolicy;
    /// let policy = TimingPolicy::default();
    /// assert!((policy.base_threshold(0.9) - 5.99).abs() < 1e-9);
    /// assert!((policy.base_threshold(3.8) - 8.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn base_threshold(&self, fall_speed: f64) -> f64 {
        let speed = if fall_speed.is_finite() {
            fall_speed.max(0.0)
        } else {
            0.0
        };
        let scaled = self.config.base_act_distance + speed * self.config.velocity_gain;
        // Not `clamp`: unvalidated settings may invert the bounds.
        scaled
            .max(self.config.base_act_distance)
            .min(self.config.max_act_distance)
    }

    /// Whether `ticks_to_impact` falls inside the short-horizon cutoff.
    #[must_use]
    pub fn is_urgent(&self, ticks_to_impact: Option<u32>) -> bool {
        ticks_to_impact.is_some_and(|ticks| ticks < self.config.urgent_ticks)
    }

    /// Decides whether to deploy now.
    ///
    /// A negative `distance_to_target` means there is no target and never
    /// triggers action.
    #[must_use]
    pub fn decide(
        &self,
        fall_speed: f64,
        ticks_to_impact: Option<u32>,
        distance_to_target: f64,
    ) -> TimingDecision {
        let urgent = self.is_urgent(ticks_to_impact);
        let mut threshold = self.base_threshold(fall_speed);
        if urgent {
            threshold *= self.config.urgent_multiplier;
        }
        let emergency = threshold * self.config.emergency_multiplier;

        if !(distance_to_target.is_finite() && distance_to_target >= 0.0) {
            return TimingDecision {
                should_act: false,
                threshold,
                urgent,
                reason: "no placement target".to_owned(),
            };
        }

        let (should_act, reason) = if distance_to_target <= threshold {
            (
                true,
                format!(
                    "distance {distance_to_target:.2} within act threshold {threshold:.2}"
                ),
            )
        } else if urgent && distance_to_target <= emergency {
            (
                true,
                format!(
                    "urgent: {} ticks to impact, distance {distance_to_target:.2} within emergency window {emergency:.2}",
                    ticks_to_impact.unwrap_or_default()
                ),
            )
        } else if fall_speed > self.config.high_speed_cutoff && distance_to_target <= emergency {
            (
                true,
                format!(
                    "high speed {fall_speed:.2}: distance {distance_to_target:.2} within emergency window {emergency:.2}"
                ),
            )
        } else {
            (
                false,
                format!(
                    "waiting: distance {distance_to_target:.2} beyond act threshold {threshold:.2}"
                ),
            )
        };

        TimingDecision {
            should_act,
            threshold,
            urgent,
            reason,
        }
    }
}
