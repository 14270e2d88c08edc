//! Per-tick fall analysis combining landing prediction, safety and timing.

use glam::DVec3;
use log::debug;
use serde::Serialize;

use crate::config::Settings;
use crate::entity::{fall_speed, EntityState};
use crate::geometry::BlockPos;
use crate::landing::{LandingPredictor, LandingResult};
use crate::physics::TrajectorySimulator;
use crate::policy::TimingPolicy;
use crate::safety::SafetyClassifier;
use crate::world::WorldQuery;
use crate::NO_TARGET_DISTANCE;

/// Everything the orchestrator needs to know about the current fall.
///
/// Rebuilt from scratch on every analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Whether to place the countermeasure now.
    pub should_act: bool,
    /// Whether any landing was found.
    pub will_land: bool,
    /// Landing details.
    pub landing: Option<LandingResult>,
    /// Block the countermeasure goes on.
    pub target_block: Option<BlockPos>,
    /// Centre of the cell above `target_block`.
    pub target_position: Option<DVec3>,
    /// Distance from the feet to the target, or [`NO_TARGET_DISTANCE`].
    pub distance_to_target: f64,
    /// Human-readable justification.
    pub reason: String,
    /// Act distance after speed and urgency scaling.
    pub act_threshold: f64,
    /// Whether impact is close in ticks.
    pub urgent: bool,
    /// Ticks until the winning sample lands.
    pub ticks_to_impact: Option<u32>,
}

impl Prediction {
    /// Prediction for a fall with no landing in range.
    #[must_use]
    pub fn no_landing(act_threshold: f64) -> Self {
        Self {
            should_act: false,
            will_land: false,
            landing: None,
            target_block: None,
            target_position: None,
            distance_to_target: NO_TARGET_DISTANCE,
            reason: "no landing predicted within simulation bounds".to_owned(),
            act_threshold,
            urgent: false,
            ticks_to_impact: None,
        }
    }

    /// Whether a placement target exists.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.distance_to_target >= 0.0
    }

    /// Whether the predicted landing is safe as it stands.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.landing
            .as_ref()
            .is_some_and(|landing| landing.verdict().is_safe)
    }

    /// Safe only while the forced posture is held.
    #[must_use]
    pub fn needs_posture(&self) -> bool {
        self.landing.as_ref().is_some_and(|landing| {
            let verdict = landing.verdict();
            verdict.is_safe && verdict.requires_side_effect
        })
    }

    /// `false` when nothing lands or the landing is safe without help.
    #[must_use]
    pub fn requires_action(&self) -> bool {
        self.will_land && (!self.is_safe() || self.needs_posture())
    }
}

/// Runs the predictor, classifier and policy for one entity snapshot.
#[derive(Debug, Clone, Default)]
pub struct FallAnalyzer {
    predictor: LandingPredictor,
    policy: TimingPolicy,
}

impl FallAnalyzer {
    /// Analyzer combining `predictor` and `policy`.
    #[must_use]
    pub const fn new(predictor: LandingPredictor, policy: TimingPolicy) -> Self {
        Self { predictor, policy }
    }

    /// Builds an analyzer from every relevant settings section.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let simulator = TrajectorySimulator::new(settings.simulation.clone());
        let classifier = SafetyClassifier::new(settings.safety.clone());
        Self::new(
            LandingPredictor::new(simulator, classifier),
            TimingPolicy::new(settings.policy.clone()),
        )
    }

    /// Timing policy.
    #[must_use]
    pub const fn policy(&self) -> &TimingPolicy {
        &self.policy
    }

    /// Landing predictor.
    #[must_use]
    pub const fn predictor(&self) -> &LandingPredictor {
        &self.predictor
    }

    /// Analyzes the entity's current fall.
    ///
    /// Safe landings never ask for action; their reason is the verdict's.
    #[must_use]
    pub fn analyze(&self, entity: &dyn EntityState, world: &dyn WorldQuery) -> Prediction {
        let origin = entity.position();
        let speed = fall_speed(entity);
        let Some(landing) = self.predictor.predict(
            world,
            &entity.footprint(),
            origin,
            entity.velocity(),
            entity.fall_distance(),
        ) else {
            return Prediction::no_landing(self.policy.base_threshold(speed));
        };

        let ticks_to_impact = landing.ticks_to_impact();
        let target_position = landing.target_position();
        let distance_to_target = origin.distance(target_position);
        let target_block = Some(landing.landing_block());

        let (should_act, act_threshold, urgent, reason) = if landing.verdict().is_safe {
            let urgent = self.policy.is_urgent(ticks_to_impact);
            let mut threshold = self.policy.base_threshold(speed);
            if urgent {
                threshold *= self.policy.config().urgent_multiplier;
            }
            (false, threshold, urgent, landing.verdict().reason.clone())
        } else {
            let decision = self.policy.decide(speed, ticks_to_impact, distance_to_target);
            let reason = format!("{}; {}", landing.verdict().reason, decision.reason);
            (decision.should_act, decision.threshold, decision.urgent, reason)
        };

        debug!(
            "speed {speed:.2}, target {distance_to_target:.2} away, {ticks_to_impact:?} ticks: {reason}"
        );

        Prediction {
            should_act,
            will_land: true,
            landing: Some(landing),
            target_block,
            target_position: Some(target_position),
            distance_to_target,
            reason,
            act_threshold,
            urgent,
            ticks_to_impact,
        }
    }
}
