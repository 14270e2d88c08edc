//! Small voxel worlds used across integration tests.

use softfall::{BlockKind, BlockPos, VoxelGrid};

/// Height of the floor layer built by [`floor_world`].
pub const FLOOR_Y: i32 = 60;

/// A 9x9 floor of `kind` at [`FLOOR_Y`] resting on stone.
///
/// Standing height on the floor is `FLOOR_Y + 1`.
///
/// # Examples
/// ```
/// use softfall::{BlockKind, BlockPos, WorldQuery};
/// use test_utils::floor_world;
/// let world = floor_world(BlockKind::HayBale);
/// assert_eq!(world.block_at(BlockPos::new(0, 60, 0)), BlockKind::HayBale);
/// assert_eq!(world.block_at(BlockPos::new(0, 59, 0)), BlockKind::Stone);
/// ```
#[must_use]
pub fn floor_world(kind: BlockKind) -> VoxelGrid {
    let mut world = VoxelGrid::new();
    world.fill_layer(FLOOR_Y - 1, (-4, 4), (-4, 4), BlockKind::Stone);
    world.fill_layer(FLOOR_Y, (-4, 4), (-4, 4), kind);
    world
}

/// A stone floor with a plank pillar of height `rise` at `(1, 1)`.
#[must_use]
pub fn ledge_world(rise: i32) -> VoxelGrid {
    let mut world = floor_world(BlockKind::Stone);
    for dy in 1..=rise {
        world.set(BlockPos::new(1, FLOOR_Y + dy, 1), BlockKind::OakPlanks);
    }
    world
}
