//! Protective countermeasures and how to choose between them.
//!
//! The set is closed: water, or one of the blocks that absorb an impact.
//! Each variant knows the item it consumes, its priority, when it applies and
//! where it can be placed. [`select`] folds over a preference list and keeps
//! the highest priority applicable variant.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::action::ActionExecutor;
use crate::entity::{EntityState, ItemKind};
use crate::geometry::BlockPos;
use crate::landing::LandingResult;
use crate::world::{BlockCategory, BlockKind, WorldQuery};

/// A deployable fall countermeasure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Countermeasure {
    /// Empty a water bucket onto the landing block.
    Water,
    /// Place an impact-absorbing block on the landing block.
    Block(BlockKind),
}

impl Countermeasure {
    /// Item consumed when the countermeasure is deployed.
    #[must_use]
    pub const fn item(self) -> ItemKind {
        match self {
            Self::Water => ItemKind::WaterBucket,
            Self::Block(kind) => ItemKind::Block(kind),
        }
    }

    /// Preference when several countermeasures apply. Higher wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Water => 100,
            Self::Block(BlockKind::SlimeBlock) => 90,
            Self::Block(BlockKind::HoneyBlock) => 80,
            Self::Block(BlockKind::PowderSnow) => 75,
            Self::Block(BlockKind::HayBale) => 70,
            Self::Block(BlockKind::Cobweb) => 60,
            Self::Block(_) => 10,
        }
    }

    /// Whether the countermeasure could help this entity on this landing.
    ///
    /// The entity must carry the item and the landing must be unsafe. Block
    /// variants only apply to blocks that actually absorb an impact.
    #[must_use]
    pub fn is_applicable(self, entity: &dyn EntityState, landing: &LandingResult) -> bool {
        if landing.verdict().is_safe || !entity.has_item(self.item()) {
            return false;
        }
        match self {
            Self::Water => landing.landing_kind() != BlockKind::Lava,
            Self::Block(kind) => kind.category() == BlockCategory::DamageAbsorbing,
        }
    }

    /// Whether the countermeasure can be placed on top of `target`.
    #[must_use]
    pub fn is_executable(self, world: &dyn WorldQuery, target: BlockPos) -> bool {
        let supported = world.is_solid(target);
        let room = world.block_at(target.above()).is_replaceable();
        match self {
            Self::Water => supported && room && !world.evaporates_water(),
            Self::Block(_) => supported && room,
        }
    }

    /// First candidate block, highest first, that can take the placement.
    #[must_use]
    pub fn placement_target(self, world: &dyn WorldQuery, landing: &LandingResult) -> Option<BlockPos> {
        landing
            .candidate_blocks()
            .iter()
            .copied()
            .find(|block| self.is_executable(world, *block))
    }

    /// Asks the executor to place the countermeasure against `target`.
    pub fn execute(
        self,
        executor: &mut dyn ActionExecutor,
        target: BlockPos,
        position: DVec3,
    ) -> bool {
        executor.attempt_placement(target, position, self.item())
    }

    /// Clean-up once the entity has landed on a placed countermeasure.
    ///
    /// Water is scooped back up; blocks stay where they are. Returns whether
    /// the executor reported a recovery.
    pub fn post_landing(self, executor: &mut dyn ActionExecutor, placed_at: BlockPos) -> bool {
        match self {
            Self::Water => executor.recover_placement(placed_at, self.item()),
            Self::Block(_) => false,
        }
    }
}

impl fmt::Display for Countermeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Water => f.write_str("water"),
            Self::Block(kind) => write!(f, "{kind}"),
        }
    }
}

/// Highest priority countermeasure in `options` applicable to `landing`.
///
/// Ties keep the earlier entry of `options`.
#[must_use]
pub fn select(
    options: &[Countermeasure],
    entity: &dyn EntityState,
    landing: &LandingResult,
) -> Option<Countermeasure> {
    options
        .iter()
        .copied()
        .filter(|option| option.is_applicable(entity, landing))
        .fold(None, |best, option| match best {
            Some(current) if current.priority() >= option.priority() => Some(current),
            _ => Some(option),
        })
}
