//! Multi-point landing prediction.
//!
//! The entity's footprint is sampled at thirteen points on its bottom face
//! and each point is simulated independently. The highest landing block wins,
//! so a ledge clipped by one corner is not missed by a centre-only ray.

use std::cmp::Ordering;

use glam::DVec3;
use hashbrown::HashSet;
use log::debug;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::geometry::{Aabb, BlockPos};
use crate::physics::{SimulationResult, TrajectorySimulator};
use crate::safety::{FallContext, SafetyClassifier, SafetyVerdict};
use crate::world::{BlockKind, WorldQuery};

/// Landing found for one footprint sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingCandidate {
    /// Sample point on the footprint's bottom face.
    pub origin: DVec3,
    /// Where the sample's trajectory first collides.
    pub impact_position: DVec3,
    /// Block hit by the sample.
    pub landing_block: BlockPos,
    /// Index into the footprint's bottom samples.
    pub sample_index: usize,
}

/// The predictor's chosen landing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingResult {
    landing_block: BlockPos,
    landing_kind: BlockKind,
    landing_position: DVec3,
    candidate_blocks: Vec<BlockPos>,
    target_position: DVec3,
    verdict: SafetyVerdict,
    #[serde(skip)]
    simulation: SimulationResult,
}

impl LandingResult {
    /// Highest block any sample lands on.
    #[must_use]
    pub const fn landing_block(&self) -> BlockPos {
        self.landing_block
    }

    /// Kind of the landing block.
    #[must_use]
    pub const fn landing_kind(&self) -> BlockKind {
        self.landing_kind
    }

    /// Predicted feet position at impact.
    #[must_use]
    pub const fn landing_position(&self) -> DVec3 {
        self.landing_position
    }

    /// Every distinct landing block, highest first.
    ///
    /// Blocks at equal elevation are ordered by horizontal distance from the
    /// entity so fallback placement tries the nearest first.
    #[must_use]
    pub fn candidate_blocks(&self) -> &[BlockPos] {
        &self.candidate_blocks
    }

    /// Centre of the cell directly above the landing block.
    #[must_use]
    pub const fn target_position(&self) -> DVec3 {
        self.target_position
    }

    /// Safety classification of the landing block.
    #[must_use]
    pub const fn verdict(&self) -> &SafetyVerdict {
        &self.verdict
    }

    /// Simulation of the winning sample.
    #[must_use]
    pub const fn simulation(&self) -> &SimulationResult {
        &self.simulation
    }

    /// Ticks until the winning sample lands.
    #[must_use]
    pub fn ticks_to_impact(&self) -> Option<u32> {
        self.simulation.ticks_to_impact()
    }
}

/// Runs the simulator across a footprint and classifies the result.
#[derive(Debug, Clone, Default)]
pub struct LandingPredictor {
    simulator: TrajectorySimulator,
    classifier: SafetyClassifier,
}

impl LandingPredictor {
    /// Predictor using `simulator` and `classifier`.
    #[must_use]
    pub const fn new(simulator: TrajectorySimulator, classifier: SafetyClassifier) -> Self {
        Self {
            simulator,
            classifier,
        }
    }

    /// The simulator used for every sample.
    #[must_use]
    pub const fn simulator(&self) -> &TrajectorySimulator {
        &self.simulator
    }

    /// Predicts where an entity with `footprint` at `origin` moving at
    /// `velocity` will land.
    ///
    /// `fallen` is the distance already fallen, used for the lattice rule.
    /// Returns `None` when no sample point lands within the simulator's
    /// bounds.
    #[must_use]
    pub fn predict(
        &self,
        world: &dyn WorldQuery,
        footprint: &Aabb,
        origin: DVec3,
        velocity: DVec3,
        fallen: f64,
    ) -> Option<LandingResult> {
        let samples = self.sample(world, footprint, velocity);
        let (winner, simulation) = select_highest(&samples)?;

        let offset = winner.origin - origin;
        let landing_position = winner.impact_position - offset;
        let landing_block = winner.landing_block;
        let candidate_blocks = distinct_blocks(&samples, landing_block, origin);
        let context = FallContext::new(fallen, origin.y - landing_position.y);
        let verdict = self.classifier.classify(world, landing_block, &context);

        debug!(
            "{} of 13 samples landed; highest {landing_block} ({}) after {:?} ticks",
            samples.len(),
            world.block_at(landing_block),
            simulation.ticks_to_impact()
        );

        Some(LandingResult {
            landing_block,
            landing_kind: world.block_at(landing_block),
            landing_position,
            candidate_blocks,
            target_position: landing_block.above().centre(),
            verdict,
            simulation: simulation.clone(),
        })
    }

    /// Simulates every footprint sample, returning those that landed in
    /// sample order.
    #[must_use]
    pub fn sample(
        &self,
        world: &dyn WorldQuery,
        footprint: &Aabb,
        velocity: DVec3,
    ) -> Vec<(LandingCandidate, SimulationResult)> {
        footprint
            .bottom_samples()
            .into_iter()
            .enumerate()
            .filter_map(|(sample_index, point)| {
                let simulation = self
                    .simulator
                    .simulate(point, velocity, |from, to| landing_collision(world, from, to));
                let impact = simulation.impact()?;
                let landing_block = impact.collided_block?;
                let candidate = LandingCandidate {
                    origin: point,
                    impact_position: impact.position,
                    landing_block,
                    sample_index,
                };
                Some((candidate, simulation))
            })
            .collect()
    }
}

/// Collision rule used for landing prediction.
///
/// A hit is either a solid cell along the segment's line of sight or any
/// fall-catching cell (fluid, web, plant) at the segment's end.
#[must_use]
pub fn landing_collision(world: &dyn WorldQuery, from: DVec3, to: DVec3) -> Option<BlockPos> {
    world.raycast(from, to).or_else(|| {
        let cell = BlockPos::containing(to);
        world.block_at(cell).catches_fall().then_some(cell)
    })
}

/// Strictly highest landing block; ties keep the earliest sample.
fn select_highest(
    samples: &[(LandingCandidate, SimulationResult)],
) -> Option<(&LandingCandidate, &SimulationResult)> {
    let mut best: Option<&(LandingCandidate, SimulationResult)> = None;
    for entry in samples {
        match best {
            Some((current, _)) if entry.0.landing_block.y <= current.landing_block.y => {}
            _ => best = Some(entry),
        }
    }
    best.map(|(candidate, simulation)| (candidate, simulation))
}

fn distinct_blocks(
    samples: &[(LandingCandidate, SimulationResult)],
    primary: BlockPos,
    origin: DVec3,
) -> Vec<BlockPos> {
    let mut seen = HashSet::new();
    let mut blocks: Vec<BlockPos> = samples
        .iter()
        .map(|(candidate, _)| candidate.landing_block)
        .filter(|block| seen.insert(*block))
        .collect();
    blocks.sort_by(|a, b| compare_for_fallback(*a, *b, primary, origin));
    blocks
}

/// Highest first; the primary landing block leads its elevation, then the
/// nearest columns.
fn compare_for_fallback(a: BlockPos, b: BlockPos, primary: BlockPos, origin: DVec3) -> Ordering {
    b.y.cmp(&a.y)
        .then_with(|| (b == primary).cmp(&(a == primary)))
        .then_with(|| {
            OrderedFloat(a.horizontal_distance(origin))
                .cmp(&OrderedFloat(b.horizontal_distance(origin)))
        })
        .then_with(|| a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::VoxelGrid;
    use rstest::{fixture, rstest};

    #[fixture]
    fn predictor() -> LandingPredictor {
        LandingPredictor::default()
    }

    fn body_at(feet: DVec3) -> Aabb {
        Aabb::standing_at(feet, 0.6, 1.8)
    }

    #[rstest]
    fn flat_floor_lands_on_floor(predictor: LandingPredictor) {
        let mut world = VoxelGrid::new();
        world.fill_layer(60, (-3, 3), (-3, 3), BlockKind::Stone);
        let feet = DVec3::new(0.5, 80.0, 0.5);
        let result = predictor
            .predict(&world, &body_at(feet), feet, DVec3::ZERO, 0.0)
            .expect("landing expected");
        assert_eq!(result.landing_block(), BlockPos::new(0, 60, 0));
        assert_eq!(result.landing_kind(), BlockKind::Stone);
        assert!((result.landing_position().y - 61.0).abs() < 1e-9);
        assert_eq!(result.target_position(), DVec3::new(0.5, 61.5, 0.5));
        assert!(!result.verdict().is_safe);
        assert!(result.ticks_to_impact().is_some());
    }

    #[rstest]
    fn ledge_under_one_corner_wins(predictor: LandingPredictor) {
        let mut world = VoxelGrid::new();
        world.fill_layer(50, (-3, 3), (-3, 3), BlockKind::Stone);
        // Pillar top under the +x/+z corner only.
        world.set(BlockPos::new(1, 55, 1), BlockKind::OakPlanks);
        let feet = DVec3::new(0.9, 70.0, 0.9);
        let result = predictor
            .predict(&world, &body_at(feet), feet, DVec3::ZERO, 0.0)
            .expect("landing expected");
        assert_eq!(result.landing_block(), BlockPos::new(1, 55, 1));
        assert_eq!(result.candidate_blocks().first(), Some(&BlockPos::new(1, 55, 1)));
        assert!(result.candidate_blocks().len() > 1);
    }

    #[rstest]
    fn void_predicts_nothing(predictor: LandingPredictor) {
        let world = VoxelGrid::new();
        let feet = DVec3::new(0.5, 80.0, 0.5);
        assert!(predictor
            .predict(&world, &body_at(feet), feet, DVec3::ZERO, 0.0)
            .is_none());
    }

    #[rstest]
    fn water_surface_is_caught(predictor: LandingPredictor) {
        let mut world = VoxelGrid::new();
        world.fill_layer(40, (-2, 2), (-2, 2), BlockKind::Stone);
        world.fill_layer(41, (-2, 2), (-2, 2), BlockKind::Water);
        let feet = DVec3::new(0.5, 70.0, 0.5);
        let result = predictor
            .predict(&world, &body_at(feet), feet, DVec3::new(0.0, -1.0, 0.0), 0.0)
            .expect("landing expected");
        assert_eq!(result.landing_kind(), BlockKind::Water);
        assert!(result.verdict().is_safe);
    }

    #[rstest]
    fn equal_elevation_keeps_first_sample() {
        let simulation = TrajectorySimulator::default().simulate(DVec3::ZERO, DVec3::ZERO, |_, _| {
            Some(BlockPos::new(0, -1, 0))
        });
        let candidate = |index: usize, x: i32| LandingCandidate {
            origin: DVec3::ZERO,
            impact_position: DVec3::ZERO,
            landing_block: BlockPos::new(x, 10, 0),
            sample_index: index,
        };
        let samples = vec![
            (candidate(2, 5), simulation.clone()),
            (candidate(3, 6), simulation.clone()),
            (candidate(7, 7), simulation),
        ];
        let (winner, _) = select_highest(&samples).expect("winner expected");
        assert_eq!(winner.sample_index, 2);
        assert!(select_highest(&[]).is_none());
    }

    #[rstest]
    fn fallback_order_prefers_nearer_blocks_at_equal_height() {
        let origin = DVec3::new(0.5, 70.0, 0.5);
        let primary = BlockPos::new(5, 61, 5);
        let near = BlockPos::new(0, 60, 0);
        let far = BlockPos::new(1, 60, 0);
        assert_eq!(compare_for_fallback(near, far, primary, origin), Ordering::Less);
        assert_eq!(compare_for_fallback(far, primary, primary, origin), Ordering::Greater);
    }

    #[rstest]
    fn primary_leads_its_elevation_even_when_farther() {
        let origin = DVec3::new(0.5, 70.0, 0.5);
        let primary = BlockPos::new(1, 60, 1);
        let nearer = BlockPos::new(0, 60, 0);
        assert_eq!(compare_for_fallback(primary, nearer, primary, origin), Ordering::Less);
        assert_eq!(compare_for_fallback(nearer, primary, primary, origin), Ordering::Greater);
    }

    #[rstest]
    fn straddled_floor_lists_winning_sample_first(predictor: LandingPredictor) {
        let mut world = VoxelGrid::new();
        world.fill_layer(60, (-3, 3), (-3, 3), BlockKind::Stone);
        let feet = DVec3::new(1.0, 80.0, 1.0);
        let result = predictor
            .predict(&world, &body_at(feet), feet, DVec3::ZERO, 0.0)
            .expect("landing expected");
        assert_eq!(result.candidate_blocks().len(), 4);
        assert_eq!(result.candidate_blocks().first(), Some(&result.landing_block()));
    }
}
