#![cfg_attr(docsrs, feature(doc_cfg))]
//! Fall-damage prediction and countermeasure timing for voxel worlds.
//!
//! The crate projects a falling entity's trajectory, predicts where its
//! footprint lands, classifies whether that landing is already safe and
//! decides when a protective block or fluid must be placed. Hosts drive it
//! through [`Orchestrator::on_tick`] and supply the world, the entity and a
//! placement executor through the traits re-exported here.
pub mod action;
pub mod clock;
pub mod config;
pub mod constants;
pub mod countermeasure;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod landing;
pub mod logging;
pub mod numeric;
pub mod orchestrator;
pub mod physics;
pub mod policy;
pub mod posture;
pub mod prediction;
pub mod safety;
pub mod scheduler;
pub mod world;
pub use constants::*;

// Re-export commonly used items
pub use action::ActionExecutor;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Settings;
pub use countermeasure::Countermeasure;
pub use entity::{EntityState, ItemKind};
pub use error::{ConfigError, ListenerError};
pub use geometry::{Aabb, BlockPos};
pub use landing::{LandingPredictor, LandingResult};
pub use logging::init as init_logging;
pub use orchestrator::{
    FallOutcome, FallState, Orchestrator, SessionSummary, StateChange, StateChangeListener,
};
pub use physics::{SimulationResult, TrajectorySimulator};
pub use policy::{TimingDecision, TimingPolicy};
pub use posture::{PostureControl, PostureGuard};
pub use prediction::{FallAnalyzer, Prediction};
pub use safety::{SafetyClassifier, SafetyVerdict};
pub use scheduler::PollScheduler;
pub use world::{BlockKind, VoxelGrid, WorldQuery};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use softfall::prelude::*;
    //! ```

    pub use crate::{
        Aabb, ActionExecutor, BlockKind, BlockPos, EntityState, FallState, ItemKind,
        Orchestrator, PostureControl, Settings, StateChangeListener, VoxelGrid, WorldQuery,
    };
    pub use glam::DVec3;
}
