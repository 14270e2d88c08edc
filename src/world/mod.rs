//! World queries consumed by the prediction engine.
//!
//! Hosts expose their voxel world through [`WorldQuery`]; only
//! [`WorldQuery::block_at`] is required; solidity and line-of-sight casts have
//! default implementations derived from it. [`VoxelGrid`] is a sparse
//! in-memory implementation used by the demo binary and tests.

mod block;
mod grid;
mod raycast;
mod scan;

use glam::DVec3;

use crate::geometry::BlockPos;

pub use block::{BlockCategory, BlockKind};
pub use grid::VoxelGrid;
pub use raycast::cast_voxels;
pub use scan::height_above_ground;

/// Read-only view of the voxel world.
pub trait WorldQuery {
    /// Block type stored at `pos`.
    fn block_at(&self, pos: BlockPos) -> BlockKind;

    /// Whether `pos` holds a block with a collision box.
    fn is_solid(&self, pos: BlockPos) -> bool {
        self.block_at(pos).is_solid()
    }

    /// First solid cell on the segment from `from` to `to`, if any.
    fn raycast(&self, from: DVec3, to: DVec3) -> Option<BlockPos> {
        cast_voxels(from, to, |cell| self.is_solid(cell))
    }

    /// Whether placed water evaporates immediately in this world.
    fn evaporates_water(&self) -> bool {
        false
    }
}

impl<W: WorldQuery + ?Sized> WorldQuery for &W {
    fn block_at(&self, pos: BlockPos) -> BlockKind {
        (**self).block_at(pos)
    }

    fn is_solid(&self, pos: BlockPos) -> bool {
        (**self).is_solid(pos)
    }

    fn raycast(&self, from: DVec3, to: DVec3) -> Option<BlockPos> {
        (**self).raycast(from, to)
    }

    fn evaporates_water(&self) -> bool {
        (**self).evaporates_water()
    }
}
