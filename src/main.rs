//! Drops a simulated entity onto a floor and reports how the orchestrator
//! reacts.
//!
//! World physics and orchestrator polling share one loop and one manual
//! clock, so the entity snapshot handed to each tick is always consistent.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;
use softfall::config::SimulationConfig;
use softfall::entity::fall_speed;
use softfall::physics::step_velocity;
use softfall::prelude::*;
use softfall::{
    init_logging, Clock, ListenerError, ManualClock, PollScheduler, SessionSummary, StateChange,
};

/// Simulated world time per physics tick.
const GAME_TICK: Duration = Duration::from_millis(50);
/// Resolution of the shared clock.
const CLOCK_STEP: Duration = Duration::from_millis(5);
/// Bound on the demo loop, in clock steps.
const MAX_STEPS: u32 = 40_000;

/// Drop an entity and watch the fall countermeasure engine respond
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Drop height above the floor, in blocks
    #[arg(long, default_value_t = 40.0)]
    height: f64,
    /// Block the floor is made of
    #[arg(long, default_value = "stone")]
    floor: BlockKind,
    /// Item the entity carries
    #[arg(long, default_value = "water_bucket")]
    item: ItemKind,
    /// TOML settings file layered over the defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print transitions as JSON lines on stdout
    #[arg(long)]
    json: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// A falling body moved by the world's physics.
struct Faller {
    position: DVec3,
    velocity: DVec3,
    on_ground: bool,
    fall_distance: f64,
    item: ItemKind,
}

impl Faller {
    const fn dropped_from(position: DVec3, item: ItemKind) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            on_ground: false,
            fall_distance: 0.0,
            item,
        }
    }

    /// Advances one physics tick against the current world.
    fn advance(&mut self, world: &VoxelGrid, physics: &SimulationConfig) {
        if self.on_ground {
            return;
        }
        let velocity = step_velocity(self.velocity, physics);
        let to = self.position + velocity;

        if let Some(hit) = world.raycast(self.position, to) {
            self.fall_distance += self.position.y - hit.top();
            self.position.y = hit.top();
            self.settle();
            return;
        }

        self.fall_distance += (self.position.y - to.y).max(0.0);
        self.position = to;
        self.velocity = velocity;
        // Fluids and webs end the demo fall as well.
        if world.block_at(BlockPos::containing(to)).absorbs_impact() {
            self.settle();
        }
    }

    fn settle(&mut self) {
        self.velocity = DVec3::ZERO;
        self.on_ground = true;
    }
}

impl EntityState for Faller {
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
        Aabb::standing_at(self.position, 0.6, 1.8)
    }

    fn is_holding(&self, item: ItemKind) -> bool {
        self.item == item
    }

    fn is_crouching(&self) -> bool {
        false
    }
}

/// World change requested by the orchestrator.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Place(BlockPos, BlockKind),
    Clear(BlockPos),
}

/// Queues placements so the loop applies them between ticks.
struct DemoExecutor {
    edits: Arc<Mutex<Vec<Edit>>>,
}

impl DemoExecutor {
    fn push(&self, edit: Edit) -> bool {
        self.edits.lock().map(|mut edits| edits.push(edit)).is_ok()
    }
}

impl ActionExecutor for DemoExecutor {
    fn attempt_placement(&mut self, target_block: BlockPos, _target: DVec3, item: ItemKind) -> bool {
        let kind = match item {
            ItemKind::WaterBucket => BlockKind::Water,
            ItemKind::Block(kind) => kind,
        };
        self.push(Edit::Place(target_block.above(), kind))
    }

    fn recover_placement(&mut self, placed_at: BlockPos, _item: ItemKind) -> bool {
        self.push(Edit::Clear(placed_at))
    }
}

fn apply_edits(world: &mut VoxelGrid, edits: &Mutex<Vec<Edit>>) {
    let Ok(mut pending) = edits.lock() else {
        return;
    };
    for edit in pending.drain(..) {
        match edit {
            Edit::Place(pos, kind) => world.set(pos, kind),
            Edit::Clear(pos) => world.set(pos, BlockKind::Air),
        }
    }
}

/// Reports transitions through the logger or as JSON lines.
struct Reporter {
    json: bool,
}

impl Reporter {
    fn emit(value: &impl Serialize) -> Result<(), ListenerError> {
        let line = serde_json::to_string(value)
            .map_err(|err| ListenerError::new("reporter", err.to_string()))?;
        writeln!(std::io::stdout().lock(), "{line}")
            .map_err(|err| ListenerError::new("reporter", err.to_string()))
    }
}

impl StateChangeListener for Reporter {
    fn on_transition(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        if self.json {
            Self::emit(change)
        } else {
            Ok(())
        }
    }

    fn on_fall_ended(
        &mut self,
        _change: &StateChange,
        summary: &SessionSummary,
    ) -> Result<(), ListenerError> {
        if self.json {
            return Self::emit(&serde_json::json!({ "summary": summary }));
        }
        info!(
            "session over after {:.1} blocks in {:?}: {:?}",
            summary.fall_distance, summary.duration, summary.outcome
        );
        Ok(())
    }
}

fn build_world(floor: BlockKind) -> VoxelGrid {
    let mut world = VoxelGrid::new();
    world.fill_layer(-1, (-4, 4), (-4, 4), BlockKind::Stone);
    world.fill_layer(0, (-4, 4), (-4, 4), floor);
    world
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    let mut world = build_world(args.floor);
    let edits = Arc::new(Mutex::new(Vec::new()));
    let clock = ManualClock::new();

    let executor = DemoExecutor {
        edits: Arc::clone(&edits),
    };
    let mut orchestrator = Orchestrator::new(&settings, Box::new(executor)).with_clock(clock.clone());
    orchestrator.add_listener("reporter", Reporter { json: args.json });
    let mut scheduler = PollScheduler::new(settings.polling.clone());

    let start = DVec3::new(0.5, 1.0 + args.height.max(0.0), 0.5);
    let mut faller = Faller::dropped_from(start, args.item);
    info!(
        "dropping from {:.1} onto {} carrying {}",
        args.height, args.floor, args.item
    );

    let mut next_physics = Duration::ZERO;
    for _ in 0..MAX_STEPS {
        let now = clock.now();
        if now >= next_physics {
            faller.advance(&world, &settings.simulation);
            next_physics += GAME_TICK;
        }
        if scheduler.is_due(now) {
            orchestrator.on_tick(Some(&faller), Some(&world));
            scheduler.reschedule(now, fall_speed(&faller), !faller.on_ground);
            apply_edits(&mut world, &edits);
        }
        if faller.on_ground && orchestrator.state() == FallState::Idle {
            break;
        }
        clock.advance(CLOCK_STEP);
    }

    let stats = orchestrator.stats();
    info!(
        "landed at y={:.2} after {:.1} blocks; {} attempt(s), {} placed",
        faller.position.y, faller.fall_distance, stats.attempts, stats.successes
    );
    Ok(())
}
