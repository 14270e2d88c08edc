//! Placement orchestrator: the fall-session state machine.
//!
//! The orchestrator is the only stateful part of the engine. Each call to
//! [`Orchestrator::on_tick`] evaluates the current [`FallState`] against a
//! fresh entity snapshot and applies at most one transition, except that
//! [`FallState::FallEnded`] always settles back to [`FallState::Idle`] within
//! the same tick:
//!
//! ```text
//! IDLE -> FALL_DETECTED -> TRACKING_FALL -> READY_TO_PLACE -> WATER_PLACED -> FALL_ENDED -> IDLE
//! ```
//!
//! Missing entity or world data, or [`Orchestrator::force_reset`], drops the
//! session from any state and releases the forced posture.
//!
//! Ticks must be serialised by the host. [`crate::scheduler::PollScheduler`]
//! decides when the next one is due.

mod events;
mod state;
mod summary;

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};

use crate::action::ActionExecutor;
use crate::clock::{Clock, SystemClock};
use crate::config::{OrchestratorConfig, Settings};
use crate::countermeasure::{self, Countermeasure};
use crate::entity::{fall_speed, EntityState};
use crate::geometry::BlockPos;
use crate::physics::ticks_to_descend;
use crate::posture::{NoPosture, PostureControl, PostureGuard};
use crate::prediction::{FallAnalyzer, Prediction};
use crate::world::{height_above_ground, WorldQuery};

pub use events::{ListenerId, StateChange, StateChangeListener};
pub use state::{FallState, Session};
pub use summary::{FallOutcome, OrchestratorStats, SessionSummary};

use events::ListenerRegistry;

/// What [`Orchestrator::process_state`] decided for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Remain in the current state.
    Stay,
    /// Move to the given state for the given reason.
    To(FallState, String),
}

impl Transition {
    fn to(state: FallState, reason: impl Into<String>) -> Self {
        Self::To(state, reason.into())
    }

    /// Destination state, if this is a move.
    #[must_use]
    pub const fn target(&self) -> Option<FallState> {
        match self {
            Self::Stay => None,
            Self::To(state, _) => Some(*state),
        }
    }
}

/// Result of one pass through the placement path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The executor reported a successful placement.
    Placed(Countermeasure, BlockPos),
    /// The executor was called and reported failure.
    Failed(Countermeasure, BlockPos),
    /// Nothing could be placed; the executor was not called.
    Unavailable(String),
    /// The session already made its attempt.
    AlreadyAttempted,
    /// There is no fall session to act for.
    NoSession,
}

impl AttemptOutcome {
    /// Whether this call consumed the session's attempt.
    #[must_use]
    pub const fn is_attempt(&self) -> bool {
        matches!(
            self,
            Self::Placed(..) | Self::Failed(..) | Self::Unavailable(_)
        )
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placed(countermeasure, target) => {
                write!(f, "placed {countermeasure} on {target}")
            }
            Self::Failed(countermeasure, target) => write!(
                f,
                "placing {countermeasure} on {target} failed; counted as handled"
            ),
            Self::Unavailable(detail) => write!(f, "no placement possible: {detail}"),
            Self::AlreadyAttempted => f.write_str("placement already attempted this session"),
            Self::NoSession => f.write_str("no active fall session"),
        }
    }
}

/// Drives one entity's fall sessions.
pub struct Orchestrator {
    config: OrchestratorConfig,
    analyzer: FallAnalyzer,
    clock: Box<dyn Clock + Send>,
    executor: Box<dyn ActionExecutor + Send>,
    posture_control: Box<dyn PostureControl + Send>,
    posture: PostureGuard,
    state: FallState,
    session: Option<Session>,
    last_attempt: Option<Duration>,
    last_summary: Option<SessionSummary>,
    listeners: ListenerRegistry,
    stats: OrchestratorStats,
    /// The current airborne stretch was already judged safe once.
    dismissed_fall: bool,
}

impl Orchestrator {
    /// Creates an idle orchestrator using the system clock and no posture
    /// control.
    #[must_use]
    pub fn new(settings: &Settings, executor: Box<dyn ActionExecutor + Send>) -> Self {
        Self {
            config: settings.orchestrator.clone(),
            analyzer: FallAnalyzer::from_settings(settings),
            clock: Box::new(SystemClock::new()),
            executor,
            posture_control: Box::new(NoPosture),
            posture: PostureGuard::new(),
            state: FallState::Idle,
            session: None,
            last_attempt: None,
            last_summary: None,
            listeners: ListenerRegistry::default(),
            stats: OrchestratorStats::default(),
            dismissed_fall: false,
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Supplies the host's crouch capability.
    #[must_use]
    pub fn with_posture(mut self, control: impl PostureControl + Send + 'static) -> Self {
        self.posture_control = Box::new(control);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> FallState {
        self.state
    }

    /// The in-flight fall, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Latest prediction of the in-flight fall.
    #[must_use]
    pub fn prediction(&self) -> Option<&Prediction> {
        self.session.as_ref().and_then(Session::prediction)
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> &OrchestratorStats {
        &self.stats
    }

    /// Summary of the most recently completed session.
    #[must_use]
    pub const fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Clock time of the most recent placement attempt.
    #[must_use]
    pub const fn last_attempt(&self) -> Option<Duration> {
        self.last_attempt
    }

    /// Whether the orchestrator currently holds the forced posture.
    #[must_use]
    pub const fn is_posture_engaged(&self) -> bool {
        self.posture.is_engaged()
    }

    /// Analyzer used for predictions.
    #[must_use]
    pub const fn analyzer(&self) -> &FallAnalyzer {
        &self.analyzer
    }

    /// Registers a listener, returning a handle for later removal.
    pub fn add_listener(
        &mut self,
        name: impl Into<String>,
        listener: impl StateChangeListener + Send + 'static,
    ) -> ListenerId {
        self.listeners.add(name, Box::new(listener))
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Runs one polling tick and returns the resulting state.
    ///
    /// Passing `None` for either argument means the host could not supply
    /// it this tick; any session is abandoned and the posture released.
    pub fn on_tick(
        &mut self,
        entity: Option<&dyn EntityState>,
        world: Option<&dyn WorldQuery>,
    ) -> FallState {
        let now = self.clock.now();
        let (Some(entity), Some(world)) = (entity, world) else {
            if self.state.in_session() || self.posture.is_engaged() {
                warn!("entity or world unavailable during {}; resetting", self.state);
                self.reset("entity or world unavailable", now);
            }
            return self.state;
        };

        let step = self.process_state(entity, world, now);
        self.apply(step, entity, now);
        if self.state == FallState::FallEnded {
            let settle = self.process_state(entity, world, now);
            self.apply(settle, entity, now);
        }
        self.state
    }

    /// Abandons any session and returns to [`FallState::Idle`].
    ///
    /// For disconnects and other host lifecycle events. The posture is
    /// released synchronously.
    pub fn force_reset(&mut self) {
        let now = self.clock.now();
        info!("forced reset from {}", self.state);
        self.reset("forced reset", now);
    }

    /// Evaluates the current state without applying the result.
    ///
    /// Total over every state: the answer is always a move or
    /// [`Transition::Stay`]. Session bookkeeping (the latest prediction and
    /// the placement attempt) is updated as a side effect.
    pub fn process_state(
        &mut self,
        entity: &dyn EntityState,
        world: &dyn WorldQuery,
        now: Duration,
    ) -> Transition {
        match self.state {
            FallState::Idle => self.process_idle(entity, now),
            FallState::FallDetected => self.process_detected(entity, world),
            FallState::TrackingFall => self.process_tracking(entity, world),
            FallState::ReadyToPlace => self.process_ready(entity, world),
            FallState::WaterPlaced => self.process_placed(entity, world, now),
            FallState::FallEnded => Transition::to(FallState::Idle, "session complete"),
        }
    }

    /// Deploys a countermeasure for the current session, at most once.
    ///
    /// The first call records the attempt whatever happens; later calls in
    /// the same session return [`AttemptOutcome::AlreadyAttempted`] without
    /// touching the executor.
    pub fn attempt_action(
        &mut self,
        entity: &dyn EntityState,
        world: &dyn WorldQuery,
    ) -> AttemptOutcome {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return AttemptOutcome::NoSession;
        };
        if session.attempted {
            return AttemptOutcome::AlreadyAttempted;
        }
        session.attempted = true;
        session.attempted_at = Some(now);
        self.last_attempt = Some(now);
        self.stats.attempts += 1;

        let Some(landing) = session.prediction.as_ref().and_then(|p| p.landing.as_ref()) else {
            self.stats.failures += 1;
            return AttemptOutcome::Unavailable("no landing predicted".to_owned());
        };
        let Some(chosen) = countermeasure::select(&self.config.countermeasures, entity, landing)
        else {
            self.stats.failures += 1;
            return AttemptOutcome::Unavailable(format!(
                "no countermeasure available for {}",
                landing.landing_kind()
            ));
        };
        let Some(target) = chosen.placement_target(world, landing) else {
            self.stats.failures += 1;
            return AttemptOutcome::Unavailable(format!("no candidate block can take {chosen}"));
        };
        let position = if target == landing.landing_block() {
            landing.target_position()
        } else {
            target.above().centre()
        };

        session.countermeasure = Some(chosen);
        session.placed_at = Some(target.above());
        let success = chosen.execute(self.executor.as_mut(), target, position);
        session.placement_succeeded = success;

        if success {
            self.stats.successes += 1;
            info!("placed {chosen} on {target}");
            AttemptOutcome::Placed(chosen, target)
        } else {
            self.stats.failures += 1;
            warn!("placing {chosen} on {target} failed");
            AttemptOutcome::Failed(chosen, target)
        }
    }

    fn process_idle(&mut self, entity: &dyn EntityState, now: Duration) -> Transition {
        let speed = fall_speed(entity);
        if entity.is_on_ground() || speed <= self.config.fall_start_speed {
            self.dismissed_fall = false;
            return Transition::Stay;
        }
        if let Some(last) = self.last_attempt {
            let cooldown = Duration::from_millis(self.config.attempt_cooldown_ms);
            if now.saturating_sub(last) < cooldown {
                debug!("fall at {speed:.2} ignored during attempt cooldown");
                return Transition::Stay;
            }
        }
        Transition::to(
            FallState::FallDetected,
            format!("falling at {speed:.2} blocks/tick"),
        )
    }

    fn process_detected(&mut self, entity: &dyn EntityState, world: &dyn WorldQuery) -> Transition {
        if let Some(reason) = self.fall_stopped(entity, world) {
            self.dismissed_fall = false;
            return Transition::to(FallState::Idle, reason);
        }
        let reason = self.refresh_prediction(entity, world).reason;
        Transition::to(FallState::TrackingFall, reason)
    }

    fn process_tracking(&mut self, entity: &dyn EntityState, world: &dyn WorldQuery) -> Transition {
        if let Some(reason) = self.fall_stopped(entity, world) {
            self.dismissed_fall = false;
            return Transition::to(FallState::Idle, reason);
        }
        let outlook = self.refresh_prediction(entity, world);
        if !outlook.requires_action {
            self.dismissed_fall = true;
            return Transition::to(
                FallState::Idle,
                format!("no action needed: {}", outlook.reason),
            );
        }
        if outlook.needs_posture {
            return Transition::Stay;
        }

        let footprint = entity.footprint();
        match height_above_ground(world, &footprint, self.config.ground_scan_depth) {
            Some(height) => {
                let ticks = ticks_to_descend(
                    height,
                    entity.velocity().y,
                    self.analyzer.predictor().simulator().config(),
                )
                .or(outlook.ticks_to_impact);
                let decision = self.analyzer.policy().decide(fall_speed(entity), ticks, height);
                if decision.should_act {
                    Transition::to(
                        FallState::ReadyToPlace,
                        format!("{height:.2} blocks above ground; {}", decision.reason),
                    )
                } else {
                    Transition::Stay
                }
            }
            None if outlook.should_act => Transition::to(
                FallState::ReadyToPlace,
                format!("no ground within scan; {}", outlook.reason),
            ),
            None => Transition::Stay,
        }
    }

    fn process_ready(&mut self, entity: &dyn EntityState, world: &dyn WorldQuery) -> Transition {
        if let Some(reason) = self.fall_stopped(entity, world) {
            return Transition::to(
                FallState::FallEnded,
                format!("fall ended before action: {reason}"),
            );
        }
        let outcome = self.attempt_action(entity, world);
        match outcome {
            AttemptOutcome::NoSession => Transition::to(FallState::Idle, outcome.to_string()),
            _ => Transition::to(FallState::WaterPlaced, outcome.to_string()),
        }
    }

    fn process_placed(
        &mut self,
        entity: &dyn EntityState,
        world: &dyn WorldQuery,
        now: Duration,
    ) -> Transition {
        if let Some(reason) = self.fall_stopped(entity, world) {
            return Transition::to(FallState::FallEnded, reason);
        }
        let Some(session) = self.session.as_mut() else {
            return Transition::to(FallState::Idle, "no active fall session");
        };
        let since = session.attempted_at.unwrap_or(session.start_time);
        let elapsed = now.saturating_sub(since);
        if elapsed >= Duration::from_millis(self.config.placed_timeout_ms) {
            session.timed_out = true;
            return Transition::to(
                FallState::FallEnded,
                format!("no landing observed {}ms after placement", elapsed.as_millis()),
            );
        }
        Transition::Stay
    }

    /// Reason the fall is over, if it is.
    fn fall_stopped(&self, entity: &dyn EntityState, world: &dyn WorldQuery) -> Option<String> {
        if entity.is_on_ground() {
            return Some("entity is on the ground".to_owned());
        }
        let medium = world.block_at(BlockPos::containing(entity.position()));
        if medium.absorbs_impact() {
            return Some(format!("entity entered {medium}"));
        }
        let speed = fall_speed(entity);
        if speed < self.config.fall_continue_speed {
            return Some(format!("fall speed {speed:.2} no longer indicates falling"));
        }
        None
    }

    /// Rebuilds the session's prediction and engages the posture if the
    /// landing needs it.
    fn refresh_prediction(&mut self, entity: &dyn EntityState, world: &dyn WorldQuery) -> Outlook {
        let prediction = self.analyzer.analyze(entity, world);
        let outlook = Outlook::of(&prediction);
        if outlook.needs_posture && !entity.is_crouching() {
            self.posture.engage(self.posture_control.as_mut());
        }
        if let Some(session) = self.session.as_mut() {
            session.prediction = Some(prediction);
        }
        outlook
    }

    fn apply(&mut self, step: Transition, entity: &dyn EntityState, now: Duration) {
        if let Transition::To(to, reason) = step {
            self.transition(to, reason, Some(entity), now);
        }
    }

    fn reset(&mut self, reason: &str, now: Duration) {
        if self.state.in_session() {
            self.transition(FallState::Idle, reason.to_owned(), None, now);
        } else {
            self.session = None;
            self.posture.release(self.posture_control.as_mut());
        }
        self.dismissed_fall = false;
    }

    fn transition(
        &mut self,
        to: FallState,
        reason: String,
        entity: Option<&dyn EntityState>,
        now: Duration,
    ) {
        let from = self.state;
        if to == FallState::FallDetected {
            let start = entity.map(|e| e.position()).unwrap_or_default();
            let mut session = Session::new(start, now);
            session.redetected = self.dismissed_fall;
            if !session.redetected {
                self.stats.falls_detected += 1;
            }
            self.session = Some(session);
        }
        // A fall already judged safe is re-checked every poll; keep that quiet.
        let recheck = self.session.as_ref().is_some_and(|s| s.redetected)
            && matches!(
                to,
                FallState::FallDetected | FallState::TrackingFall | FallState::Idle
            );

        let summary = if to == FallState::FallEnded {
            self.dismissed_fall = false;
            let summary = self.summarise(entity, now);
            self.run_post_landing(&summary);
            self.stats.sessions_completed += 1;
            self.last_summary = Some(summary.clone());
            Some(summary)
        } else {
            None
        };

        let change = StateChange {
            from,
            to,
            reason,
            position: entity.map(|e| e.position()),
            velocity: entity.map(|e| e.velocity()),
            prediction: self.prediction().cloned(),
            timestamp: now,
        };

        self.state = to;
        if to == FallState::Idle {
            self.session = None;
            self.posture.release(self.posture_control.as_mut());
        }

        if recheck {
            debug!("{from} -> {to}: {}", change.reason);
        } else {
            info!("{from} -> {to}: {}", change.reason);
        }
        let faults = self.listeners.notify(&change, summary.as_ref());
        self.stats.listener_faults += faults;
    }

    fn summarise(&self, entity: Option<&dyn EntityState>, now: Duration) -> SessionSummary {
        let Some(session) = self.session.as_ref() else {
            return SessionSummary {
                fall_distance: 0.0,
                duration: Duration::ZERO,
                outcome: FallOutcome::EndedBeforeAction,
                countermeasure: None,
            };
        };
        let fall_distance = entity.map_or(0.0, |e| {
            (session.start_position.y - e.position().y).max(0.0)
        });
        let outcome = if !session.attempted {
            FallOutcome::EndedBeforeAction
        } else if session.timed_out {
            FallOutcome::TimedOut
        } else if session.placement_succeeded {
            FallOutcome::Protected
        } else {
            FallOutcome::PlacementFailed
        };
        SessionSummary {
            fall_distance,
            duration: now.saturating_sub(session.start_time),
            outcome,
            countermeasure: session.countermeasure,
        }
    }

    fn run_post_landing(&mut self, summary: &SessionSummary) {
        if summary.outcome != FallOutcome::Protected || !self.config.recover_water {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let (Some(chosen), Some(placed_at)) = (session.countermeasure, session.placed_at) {
            if chosen.post_landing(self.executor.as_mut(), placed_at) {
                info!("recovered {chosen} from {placed_at}");
            }
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("posture", &self.posture)
            .field("listeners", &self.listeners)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// The parts of a [`Prediction`] the state machine branches on.
#[derive(Debug, Clone)]
struct Outlook {
    should_act: bool,
    requires_action: bool,
    needs_posture: bool,
    ticks_to_impact: Option<u32>,
    reason: String,
}

impl Outlook {
    fn of(prediction: &Prediction) -> Self {
        Self {
            should_act: prediction.should_act,
            requires_action: prediction.requires_action(),
            needs_posture: prediction.needs_posture(),
            ticks_to_impact: prediction.ticks_to_impact,
            reason: prediction.reason.clone(),
        }
    }
}
