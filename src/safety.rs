//! Landing safety classification.
//!
//! Decides whether the block an entity is predicted to land on already
//! prevents fall damage. Most categories are a pure lookup; soft coverings
//! look one block down and climbable lattices depend on the fall distance.

use serde::Serialize;

use crate::config::SafetyConfig;
use crate::geometry::BlockPos;
use crate::world::{BlockCategory, BlockKind, WorldQuery};

/// Outcome of classifying a landing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyVerdict {
    /// Whether the landing is survivable.
    pub is_safe: bool,
    /// Human-readable justification naming the relevant block.
    pub reason: String,
    /// Whether the verdict only holds while a forced posture is active.
    pub requires_side_effect: bool,
}

impl SafetyVerdict {
    /// Safe as it stands.
    #[must_use]
    pub fn safe(reason: impl Into<String>) -> Self {
        Self {
            is_safe: true,
            reason: reason.into(),
            requires_side_effect: false,
        }
    }

    /// Safe provided the forced posture is engaged for the rest of the fall.
    #[must_use]
    pub fn safe_with_side_effect(reason: impl Into<String>) -> Self {
        Self {
            is_safe: true,
            reason: reason.into(),
            requires_side_effect: true,
        }
    }

    /// Landing that needs a countermeasure.
    #[must_use]
    pub fn unsafe_landing(reason: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            reason: reason.into(),
            requires_side_effect: false,
        }
    }
}

/// Fall context the contextual rules need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallContext {
    /// Total fall distance at the predicted moment of impact.
    pub projected_fall_distance: f64,
}

impl FallContext {
    /// Context for a fall that has covered `fallen` so far and will drop a
    /// further `remaining` blocks before impact.
    #[must_use]
    pub fn new(fallen: f64, remaining: f64) -> Self {
        Self {
            projected_fall_distance: fallen.max(0.0) + remaining.max(0.0),
        }
    }
}

/// Maps landing blocks to [`SafetyVerdict`]s.
#[derive(Debug, Clone, Default)]
pub struct SafetyClassifier {
    config: SafetyConfig,
}

impl SafetyClassifier {
    /// Classifier using `config`.
    #[must_use]
    pub const fn new(config: SafetyConfig) -> Self {
        Self { config }
    }

    /// Classifies the block at `landing`.
    ///
    /// Total over every block kind: always returns exactly one verdict.
    ///
    /// # Examples
    /// ```
    /// use softfall::safety::{FallContext, SafetyClassifier};
    /// use softfall::world::{BlockKind, VoxelGrid};
    /// use softfall::BlockPos;
    ///
    /// let mut world = VoxelGrid::new();
    /// let pos = BlockPos::new(0, 60, 0);
    /// world.set(pos, BlockKind::Water);
    /// let verdict = SafetyClassifier::default().classify(&world, pos, &FallContext::new(30.0, 0.0));
    /// assert!(verdict.is_safe);
    /// assert!(verdict.reason.contains("water"));
    /// ```
    #[must_use]
    pub fn classify(
        &self,
        world: &dyn WorldQuery,
        landing: BlockPos,
        context: &FallContext,
    ) -> SafetyVerdict {
        let kind = world.block_at(landing);
        match kind.category() {
            BlockCategory::SafeFluid => {
                SafetyVerdict::safe(format!("landing in {kind} cancels fall damage"))
            }
            BlockCategory::DamageNegatingPlant => {
                SafetyVerdict::safe(format!("{kind} negates fall damage"))
            }
            BlockCategory::DamageAbsorbing => {
                SafetyVerdict::safe(format!("{kind} absorbs the impact"))
            }
            BlockCategory::SoftCovering => classify_covering(kind, world.block_at(landing.below())),
            BlockCategory::ClimbableLattice => self.classify_lattice(kind, context),
            BlockCategory::HazardFluid => {
                SafetyVerdict::unsafe_landing(format!("landing in {kind} is harmful"))
            }
            BlockCategory::Passable => SafetyVerdict::unsafe_landing(format!(
                "{kind} offers no support; impact expected below"
            )),
            BlockCategory::Solid => {
                SafetyVerdict::unsafe_landing(format!("landing on {kind} causes fall damage"))
            }
        }
    }

    fn classify_lattice(&self, kind: BlockKind, context: &FallContext) -> SafetyVerdict {
        let distance = context.projected_fall_distance;
        if distance < self.config.lattice_fall_cap {
            SafetyVerdict::safe_with_side_effect(format!(
                "{kind} catches a {distance:.1} block fall while crouching"
            ))
        } else {
            SafetyVerdict::unsafe_landing(format!(
                "{kind} cannot absorb a {distance:.1} block fall (cap {:.1})",
                self.config.lattice_fall_cap
            ))
        }
    }
}

fn classify_covering(kind: BlockKind, beneath: BlockKind) -> SafetyVerdict {
    if beneath.category() == BlockCategory::DamageAbsorbing {
        SafetyVerdict::safe(format!("{kind} over {beneath} absorbs the impact"))
    } else {
        SafetyVerdict::unsafe_landing(format!(
            "{kind} over {beneath} does not absorb the impact"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::VoxelGrid;
    use rstest::{fixture, rstest};

    const LANDING: BlockPos = BlockPos::new(2, 40, 2);

    #[fixture]
    fn classifier() -> SafetyClassifier {
        SafetyClassifier::default()
    }

    fn world_with(kind: BlockKind, beneath: BlockKind) -> VoxelGrid {
        let mut world = VoxelGrid::new();
        world.set(LANDING, kind);
        world.set(LANDING.below(), beneath);
        world
    }

    #[rstest]
    fn every_kind_gets_one_verdict(classifier: SafetyClassifier) {
        for kind in BlockKind::ALL {
            let world = world_with(*kind, BlockKind::Stone);
            let verdict = classifier.classify(&world, LANDING, &FallContext::new(20.0, 0.0));
            assert!(!verdict.reason.is_empty());
            if !verdict.is_safe {
                assert!(
                    verdict.reason.contains(kind.name()),
                    "reason `{}` should name {kind}",
                    verdict.reason
                );
            }
        }
    }

    #[rstest]
    #[case(BlockKind::Water)]
    #[case(BlockKind::SlimeBlock)]
    #[case(BlockKind::HayBale)]
    #[case(BlockKind::SweetBerryBush)]
    #[case(BlockKind::Cobweb)]
    fn unconditionally_safe(classifier: SafetyClassifier, #[case] kind: BlockKind) {
        let world = world_with(kind, BlockKind::Stone);
        let verdict = classifier.classify(&world, LANDING, &FallContext::new(300.0, 0.0));
        assert!(verdict.is_safe);
        assert!(!verdict.requires_side_effect);
    }

    #[rstest]
    fn carpet_over_stone_names_underlying_block(classifier: SafetyClassifier) {
        let world = world_with(BlockKind::Carpet, BlockKind::Stone);
        let verdict = classifier.classify(&world, LANDING, &FallContext::new(20.0, 0.0));
        assert!(!verdict.is_safe);
        assert!(verdict.reason.contains("stone"));
    }

    #[rstest]
    fn carpet_over_hay_is_safe(classifier: SafetyClassifier) {
        let world = world_with(BlockKind::Carpet, BlockKind::HayBale);
        let verdict = classifier.classify(&world, LANDING, &FallContext::new(20.0, 0.0));
        assert!(verdict.is_safe);
    }

    #[rstest]
    #[case(20.0, true)]
    #[case(149.9, true)]
    #[case(150.0, false)]
    #[case(160.0, false)]
    fn lattice_respects_fall_cap(
        classifier: SafetyClassifier,
        #[case] distance: f64,
        #[case] safe: bool,
    ) {
        let world = world_with(BlockKind::Scaffolding, BlockKind::Stone);
        let verdict = classifier.classify(&world, LANDING, &FallContext::new(distance, 0.0));
        assert_eq!(verdict.is_safe, safe);
        assert_eq!(verdict.requires_side_effect, safe);
    }

    #[rstest]
    fn context_ignores_negative_components() {
        let context = FallContext::new(-3.0, 10.0);
        assert!((context.projected_fall_distance - 10.0).abs() < f64::EPSILON);
    }
}
