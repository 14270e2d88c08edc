//! Sparse in-memory voxel world.

use hashbrown::HashMap;

use super::{BlockKind, WorldQuery};
use crate::geometry::BlockPos;

/// Sparse voxel world; unset cells read as air.
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    blocks: HashMap<BlockPos, BlockKind>,
    evaporates_water: bool,
}

impl VoxelGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the world as one where placed water evaporates.
    #[must_use]
    pub fn with_water_evaporation(mut self, evaporates: bool) -> Self {
        self.evaporates_water = evaporates;
        self
    }

    /// Sets a single cell. Setting [`BlockKind::Air`] clears it.
    pub fn set(&mut self, pos: BlockPos, kind: BlockKind) {
        if kind == BlockKind::Air {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, kind);
        }
    }

    /// Fills the square `[x0, x1] x [z0, z1]` at height `y`.
    pub fn fill_layer(&mut self, y: i32, (x0, x1): (i32, i32), (z0, z1): (i32, i32), kind: BlockKind) {
        for x in x0.min(x1)..=x0.max(x1) {
            for z in z0.min(z1)..=z0.max(z1) {
                self.set(BlockPos::new(x, y, z), kind);
            }
        }
    }

    /// Number of non-air cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the grid holds only air.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

}

impl WorldQuery for VoxelGrid {
    fn block_at(&self, pos: BlockPos) -> BlockKind {
        self.blocks.get(&pos).copied().unwrap_or_default()
    }

    fn evaporates_water(&self) -> bool {
        self.evaporates_water
    }
}
