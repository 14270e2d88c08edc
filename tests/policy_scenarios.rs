//! Timing policy decisions at the points players actually hit.

use approx::assert_relative_eq;
use glam::DVec3;
use rstest::{fixture, rstest};
use softfall::prediction::FallAnalyzer;
use softfall::{BlockKind, TimingPolicy, NO_TARGET_DISTANCE};
use test_utils::{floor_world, FakeEntity};

#[fixture]
fn policy() -> TimingPolicy {
    TimingPolicy::default()
}

#[rstest]
fn water_below_never_triggers_action() {
    let world = floor_world(BlockKind::Water);
    let entity = FakeEntity::falling(DVec3::new(0.5, 64.0, 0.5), DVec3::new(0.0, -1.0, 0.0));
    let prediction = FallAnalyzer::default().analyze(&entity, &world);
    assert!(!prediction.should_act);
    assert!(prediction.reason.contains("water"));
}

#[rstest]
fn moderate_speed_acts_within_scaled_threshold(policy: TimingPolicy) {
    let decision = policy.decide(0.9, Some(20), 2.0);
    assert!(decision.should_act);
    assert!(!decision.urgent);
    assert_relative_eq!(decision.threshold, 5.99, epsilon = 1e-9);
}

#[rstest]
fn near_terminal_speed_is_urgent(policy: TimingPolicy) {
    let decision = policy.decide(3.8, Some(5), 7.0);
    assert!(decision.should_act);
    assert!(decision.urgent);
    assert_relative_eq!(decision.threshold, 9.6, epsilon = 1e-9);
}

#[rstest]
#[case(0.6, Some(30), 6.0, false)]
#[case(0.6, Some(30), 5.6, true)]
#[case(2.0, Some(6), 9.0, true)]
#[case(2.0, Some(6), 13.5, false)]
#[case(3.7, None, 11.5, true)]
#[case(3.0, None, 11.5, false)]
fn trigger_table(
    policy: TimingPolicy,
    #[case] speed: f64,
    #[case] ticks: Option<u32>,
    #[case] distance: f64,
    #[case] expected: bool,
) {
    let decision = policy.decide(speed, ticks, distance);
    assert_eq!(decision.should_act, expected, "{}", decision.reason);
}

#[rstest]
fn threshold_never_shrinks_with_speed(policy: TimingPolicy) {
    let mut previous = policy.base_threshold(0.0);
    for step in 1..=80 {
        let speed = f64::from(step) * 0.05;
        let threshold = policy.base_threshold(speed);
        assert!(threshold >= previous);
        assert!(threshold <= policy.config().max_act_distance);
        previous = threshold;
    }
}

#[rstest]
#[case(NO_TARGET_DISTANCE)]
#[case(f64::NAN)]
fn missing_target_never_acts(policy: TimingPolicy, #[case] distance: f64) {
    let decision = policy.decide(3.9, Some(1), distance);
    assert!(!decision.should_act);
}
