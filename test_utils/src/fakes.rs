//! Recording fakes for the engine's collaborator traits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::DVec3;
use softfall::orchestrator::SessionSummary;
use softfall::{
    Aabb, ActionExecutor, BlockPos, EntityState, FallState, ItemKind, ListenerError,
    PostureControl, StateChange, StateChangeListener,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plain-data entity snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeEntity {
    pub position: DVec3,
    pub velocity: DVec3,
    pub on_ground: bool,
    pub fall_distance: f64,
    pub width: f64,
    pub height: f64,
    pub items: Vec<ItemKind>,
    pub crouching: bool,
}

impl FakeEntity {
    /// A player-sized entity at `position` moving at `velocity`, holding a
    /// water bucket.
    #[must_use]
    pub fn falling(position: DVec3, velocity: DVec3) -> Self {
        Self {
            position,
            velocity,
            on_ground: false,
            fall_distance: 0.0,
            width: 0.6,
            height: 1.8,
            items: vec![ItemKind::WaterBucket],
            crouching: false,
        }
    }

    /// Replaces the carried items.
    #[must_use]
    pub fn holding(mut self, items: &[ItemKind]) -> Self {
        self.items = items.to_vec();
        self
    }

    #[must_use]
    pub const fn with_fall_distance(mut self, fallen: f64) -> Self {
        self.fall_distance = fallen;
        self
    }

    /// Puts the entity on the ground at height `y`.
    pub fn land_at(&mut self, y: f64) {
        self.position.y = y;
        self.velocity = DVec3::ZERO;
        self.on_ground = true;
    }
}

impl EntityState for FakeEntity {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn velocity(&self) -> DVec3 {
        self.velocity
    }

    fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    fn fall_distance(&self) -> f64 {
        self.fall_distance
    }

    fn footprint(&self) -> Aabb {
        Aabb::standing_at(self.position, self.width, self.height)
    }

    fn is_holding(&self, item: ItemKind) -> bool {
        self.items.contains(&item)
    }

    fn is_crouching(&self) -> bool {
        self.crouching
    }
}

/// One call to [`ActionExecutor::attempt_placement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub target_block: BlockPos,
    pub target_position: DVec3,
    pub item: ItemKind,
}

/// Executor that records every call and answers with a fixed result.
#[derive(Debug, Clone)]
pub struct RecordingExecutor {
    succeed: bool,
    placements: Arc<Mutex<Vec<Placement>>>,
    recoveries: Arc<Mutex<Vec<BlockPos>>>,
}

impl RecordingExecutor {
    #[must_use]
    pub fn succeeding() -> Self {
        Self::answering(true)
    }

    #[must_use]
    pub fn failing() -> Self {
        Self::answering(false)
    }

    fn answering(succeed: bool) -> Self {
        Self {
            succeed,
            placements: Arc::default(),
            recoveries: Arc::default(),
        }
    }

    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        lock(&self.placements).clone()
    }

    #[must_use]
    pub fn recoveries(&self) -> Vec<BlockPos> {
        lock(&self.recoveries).clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn attempt_placement(
        &mut self,
        target_block: BlockPos,
        target_position: DVec3,
        item: ItemKind,
    ) -> bool {
        lock(&self.placements).push(Placement {
            target_block,
            target_position,
            item,
        });
        self.succeed
    }

    fn recover_placement(&mut self, placed_at: BlockPos, _item: ItemKind) -> bool {
        lock(&self.recoveries).push(placed_at);
        self.succeed
    }
}

#[derive(Debug, Default)]
struct PostureLog {
    active: bool,
    activations: u32,
    releases: u32,
}

/// Crouch capability whose state is shared between clones.
#[derive(Debug, Clone, Default)]
pub struct SharedPosture(Arc<Mutex<PostureLog>>);

impl SharedPosture {
    /// A posture the player already holds.
    #[must_use]
    pub fn already_active() -> Self {
        let posture = Self::default();
        lock(&posture.0).active = true;
        posture
    }

    #[must_use]
    pub fn activations(&self) -> u32 {
        lock(&self.0).activations
    }

    #[must_use]
    pub fn releases(&self) -> u32 {
        lock(&self.0).releases
    }
}

impl PostureControl for SharedPosture {
    fn activate(&mut self) {
        let mut log = lock(&self.0);
        log.active = true;
        log.activations += 1;
    }

    fn release(&mut self) {
        let mut log = lock(&self.0);
        log.active = false;
        log.releases += 1;
    }

    fn is_active(&self) -> bool {
        lock(&self.0).active
    }
}

/// Listener that keeps every change and summary it hears.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    changes: Arc<Mutex<Vec<StateChange>>>,
    summaries: Arc<Mutex<Vec<SessionSummary>>>,
}

impl RecordingListener {
    #[must_use]
    pub fn changes(&self) -> Vec<StateChange> {
        lock(&self.changes).clone()
    }

    /// Destination states in the order they were entered.
    #[must_use]
    pub fn path(&self) -> Vec<FallState> {
        lock(&self.changes).iter().map(|change| change.to).collect()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<SessionSummary> {
        lock(&self.summaries).clone()
    }
}

impl StateChangeListener for RecordingListener {
    fn on_transition(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        lock(&self.changes).push(change.clone());
        Ok(())
    }

    fn on_fall_ended(
        &mut self,
        _change: &StateChange,
        summary: &SessionSummary,
    ) -> Result<(), ListenerError> {
        lock(&self.summaries).push(summary.clone());
        Ok(())
    }
}
