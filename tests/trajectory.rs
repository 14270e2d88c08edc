//! Trajectory simulator properties against real voxel worlds.

use approx::assert_relative_eq;
use glam::DVec3;
use rstest::rstest;
use softfall::config::SimulationConfig;
use softfall::landing::landing_collision;
use softfall::physics::{step_velocity, ticks_to_descend, Termination, TrajectorySimulator};
use softfall::{BlockKind, BlockPos, TERMINAL_VELOCITY};
use test_utils::floor_world;

#[rstest]
#[case(-0.01)]
#[case(-0.5)]
#[case(-2.0)]
#[case(-3.92)]
#[case(-8.0)]
#[case(-50.0)]
fn every_downward_start_converges_to_the_same_terminal_speed(#[case] vy: f64) {
    let config = SimulationConfig::default();
    let mut velocity = DVec3::new(0.0, vy, 0.0);
    for _ in 0..1500 {
        velocity = step_velocity(velocity, &config);
    }
    assert_relative_eq!(velocity.y, -TERMINAL_VELOCITY, epsilon = 1e-6);
    assert_relative_eq!(TERMINAL_VELOCITY, 3.92, epsilon = 1e-12);
}

#[rstest]
fn simulation_is_deterministic() {
    let world = floor_world(BlockKind::Stone);
    let simulator = TrajectorySimulator::default();
    let origin = DVec3::new(0.3, 90.0, 0.7);
    let velocity = DVec3::new(0.05, -0.4, -0.02);
    let run = || simulator.simulate(origin, velocity, |from, to| landing_collision(&world, from, to));
    assert_eq!(run(), run());
}

#[rstest]
fn impact_tick_matches_closed_descent_count() {
    let world = floor_world(BlockKind::Stone);
    let simulator = TrajectorySimulator::default();
    let origin = DVec3::new(0.5, 81.0, 0.5);
    let result = simulator.simulate(origin, DVec3::ZERO, |from, to| {
        landing_collision(&world, from, to)
    });
    let impact = result.impact().expect("floor should be hit");
    assert_eq!(impact.collided_block, Some(BlockPos::new(0, 60, 0)));
    assert_relative_eq!(impact.position.y, 61.0, epsilon = 1e-9);
    assert_eq!(
        result.ticks_to_impact(),
        ticks_to_descend(20.0, 0.0, simulator.config())
    );
}

#[rstest]
fn sideways_throw_reaches_a_wall() {
    let mut world = floor_world(BlockKind::Stone);
    for y in 61..70 {
        world.set(BlockPos::new(3, y, 0), BlockKind::Glass);
    }
    let result = TrajectorySimulator::default().simulate(
        DVec3::new(0.5, 66.0, 0.5),
        DVec3::new(1.5, 0.0, 0.0),
        |from, to| landing_collision(&world, from, to),
    );
    assert_eq!(result.termination(), Termination::Impact);
    assert_eq!(
        result.impact().and_then(|s| s.collided_block).map(|b| b.x),
        Some(3)
    );
}

#[rstest]
fn terminal_speed_drop_finds_a_single_web() {
    let mut world = softfall::VoxelGrid::new();
    world.set(BlockPos::new(0, 10, 0), BlockKind::Cobweb);
    let result = TrajectorySimulator::default().simulate(
        DVec3::new(0.5, 300.0, 0.5),
        DVec3::new(0.0, -TERMINAL_VELOCITY, 0.0),
        |from, to| landing_collision(&world, from, to),
    );
    assert_eq!(
        result.impact().and_then(|s| s.collided_block),
        Some(BlockPos::new(0, 10, 0))
    );
}
