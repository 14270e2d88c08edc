//! Executor contract checks using a mocked host.

use glam::DVec3;
use mockall::mock;
use mockall::predicate::eq;
use rstest::rstest;
use softfall::{
    ActionExecutor, BlockKind, BlockPos, FallState, ItemKind, ManualClock, Orchestrator, Settings,
};
use test_utils::{floor_world, FakeEntity};

mock! {
    pub Executor {}
    impl ActionExecutor for Executor {
        fn attempt_placement(
            &mut self,
            target_block: BlockPos,
            target_position: DVec3,
            item: ItemKind,
        ) -> bool;
        fn recover_placement(&mut self, placed_at: BlockPos, item: ItemKind) -> bool;
    }
}

fn drop_onto_stone(settings: &Settings, executor: MockExecutor) -> Orchestrator {
    let world = floor_world(BlockKind::Stone);
    let mut orchestrator =
        Orchestrator::new(settings, Box::new(executor)).with_clock(ManualClock::new());
    let mut player = FakeEntity::falling(DVec3::new(0.5, 64.0, 0.5), DVec3::new(0.0, -1.0, 0.0));
    for _ in 0..6 {
        orchestrator.on_tick(Some(&player), Some(&world));
    }
    player.land_at(61.0);
    orchestrator.on_tick(Some(&player), Some(&world));
    orchestrator
}

#[rstest]
fn placement_is_requested_once_and_water_recovered() {
    let mut executor = MockExecutor::new();
    executor
        .expect_attempt_placement()
        .withf(|block, position, item| {
            *block == BlockPos::new(0, 60, 0)
                && *position == DVec3::new(0.5, 61.5, 0.5)
                && *item == ItemKind::WaterBucket
        })
        .times(1)
        .return_const(true);
    executor
        .expect_recover_placement()
        .with(eq(BlockPos::new(0, 61, 0)), eq(ItemKind::WaterBucket))
        .times(1)
        .return_const(true);

    let orchestrator = drop_onto_stone(&Settings::default(), executor);
    assert_eq!(orchestrator.state(), FallState::Idle);
    assert_eq!(orchestrator.stats().successes, 1);
    assert!(orchestrator.last_attempt().is_some());
    assert_eq!(
        orchestrator.last_summary().map(|summary| summary.outcome),
        Some(softfall::FallOutcome::Protected)
    );
}

#[rstest]
fn recovery_can_be_disabled() {
    let mut settings = Settings::default();
    settings.orchestrator.recover_water = false;
    let mut executor = MockExecutor::new();
    executor
        .expect_attempt_placement()
        .times(1)
        .return_const(true);
    executor.expect_recover_placement().never();

    let orchestrator = drop_onto_stone(&settings, executor);
    assert_eq!(orchestrator.stats().sessions_completed, 1);
}

#[rstest]
fn failed_placement_is_not_retried_or_recovered() {
    let mut executor = MockExecutor::new();
    executor
        .expect_attempt_placement()
        .times(1)
        .return_const(false);
    executor.expect_recover_placement().never();

    let orchestrator = drop_onto_stone(&Settings::default(), executor);
    assert_eq!(orchestrator.stats().attempts, 1);
    assert_eq!(orchestrator.stats().failures, 1);
}
