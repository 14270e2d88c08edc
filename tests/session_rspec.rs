//! Behavioural tests for a complete fall session.
//!
//! Each scenario replays a short fall onto a 9x9 floor with the recording
//! fakes from `test_utils` and inspects what the host would have seen.
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use glam::DVec3;
use softfall::{BlockKind, FallOutcome, FallState, ManualClock, Orchestrator, Settings};
use test_utils::{
    floor_world, FakeEntity, Placement, RecordingExecutor, RecordingListener, SharedPosture,
};

#[derive(Debug, Clone, Default)]
struct Replay {
    path: Vec<FallState>,
    reasons: Vec<String>,
    placements: Vec<Placement>,
    recoveries: usize,
    outcomes: Vec<FallOutcome>,
    crouches: u32,
}

#[derive(Clone, Default)]
struct Env {
    replay: Arc<Mutex<Replay>>,
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env").finish_non_exhaustive()
    }
}

impl Env {
    /// Drops a player three blocks onto `floor` and records the session.
    fn play(&self, floor: BlockKind, executor: RecordingExecutor, items_held: bool) {
        softfall::logging::init_for_tests();
        let world = floor_world(floor);
        let listener = RecordingListener::default();
        let posture = SharedPosture::default();
        let mut orchestrator = Orchestrator::new(&Settings::default(), Box::new(executor.clone()))
            .with_clock(ManualClock::new())
            .with_posture(posture.clone());
        orchestrator.add_listener("recorder", listener.clone());

        let mut player =
            FakeEntity::falling(DVec3::new(0.5, 64.0, 0.5), DVec3::new(0.0, -1.0, 0.0));
        if !items_held {
            player = player.holding(&[]);
        }
        for _ in 0..4 {
            orchestrator.on_tick(Some(&player), Some(&world));
        }
        player.land_at(61.0);
        orchestrator.on_tick(Some(&player), Some(&world));

        *self.replay.lock().unwrap_or_else(PoisonError::into_inner) = Replay {
            path: listener.path(),
            reasons: listener.changes().into_iter().map(|c| c.reason).collect(),
            placements: executor.placements(),
            recoveries: executor.recoveries().len(),
            outcomes: listener.summaries().iter().map(|s| s.outcome).collect(),
            crouches: posture.activations(),
        };
    }

    fn replay(&self) -> Replay {
        self.replay
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[test]
fn falling_player_session() {
    rspec::run(&rspec::given("a player falling onto stone", Env::default(), |ctx| {
        ctx.before_each(|env| {
            env.play(BlockKind::Stone, RecordingExecutor::succeeding(), true);
        });

        ctx.then("the session walks every state in order", |env| {
            assert_eq!(
                env.replay().path,
                vec![
                    FallState::FallDetected,
                    FallState::TrackingFall,
                    FallState::ReadyToPlace,
                    FallState::WaterPlaced,
                    FallState::FallEnded,
                    FallState::Idle,
                ]
            );
        });

        ctx.then("every transition explains itself", |env| {
            let reasons = env.replay().reasons;
            assert_eq!(reasons.len(), 6);
            assert!(reasons.iter().all(|reason| !reason.is_empty()));
        });

        ctx.then("water is placed on the floor exactly once", |env| {
            let placements = env.replay().placements;
            assert_eq!(placements.len(), 1);
            let placement = placements.first().expect("one placement");
            assert_eq!(placement.target_block, softfall::BlockPos::new(0, 60, 0));
            assert_eq!(placement.item, softfall::ItemKind::WaterBucket);
        });

        ctx.then("the water is scooped back up", |env| {
            assert_eq!(env.replay().recoveries, 1);
            assert_eq!(env.replay().outcomes, vec![FallOutcome::Protected]);
        });

        ctx.when("the host rejects the placement", |ctx| {
            ctx.before_each(|env| {
                env.play(BlockKind::Stone, RecordingExecutor::failing(), true);
            });

            ctx.then("the session still completes as a failure", |env| {
                let replay = env.replay();
                assert_eq!(replay.placements.len(), 1);
                assert_eq!(replay.recoveries, 0);
                assert_eq!(replay.outcomes, vec![FallOutcome::PlacementFailed]);
                assert_eq!(replay.path.last(), Some(&FallState::Idle));
            });
        });

        ctx.when("the player carries no bucket", |ctx| {
            ctx.before_each(|env| {
                env.play(BlockKind::Stone, RecordingExecutor::succeeding(), false);
            });

            ctx.then("nothing reaches the host", |env| {
                let replay = env.replay();
                assert!(replay.placements.is_empty());
                assert_eq!(replay.outcomes, vec![FallOutcome::PlacementFailed]);
            });
        });
    }));
}

#[test]
fn cushioned_landing_session() {
    rspec::run(&rspec::given("a player falling into hay", Env::default(), |ctx| {
        ctx.before_each(|env| {
            env.play(BlockKind::HayBale, RecordingExecutor::succeeding(), true);
        });

        ctx.then("the fall is dropped without any placement", |env| {
            let replay = env.replay();
            assert!(replay.placements.is_empty());
            assert_eq!(replay.crouches, 0);
            assert_eq!(
                replay.path.get(..3),
                Some(&[FallState::FallDetected, FallState::TrackingFall, FallState::Idle][..])
            );
        });
    }));
}
