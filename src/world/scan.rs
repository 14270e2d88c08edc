//! Straight-down ground scan below a footprint.

use super::WorldQuery;
use crate::geometry::{Aabb, BlockPos};

/// Height of the footprint's base above the nearest fall-catching cell.
///
/// Scans the centre and corner columns at most `depth` cells down and returns
/// the smallest gap, or `None` when every column is open for the whole scan.
/// A base already inside a catching cell reports zero.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use softfall::world::{height_above_ground, BlockKind, VoxelGrid};
/// use softfall::{Aabb, BlockPos};
///
/// let mut world = VoxelGrid::new();
/// world.set(BlockPos::new(0, 60, 0), BlockKind::Stone);
/// let body = Aabb::standing_at(DVec3::new(0.5, 64.5, 0.5), 0.6, 1.8);
/// assert_eq!(height_above_ground(&world, &body, 16), Some(3.5));
/// assert_eq!(height_above_ground(&world, &body, 2), None);
/// ```
#[must_use]
pub fn height_above_ground(world: &dyn WorldQuery, footprint: &Aabb, depth: u32) -> Option<f64> {
    let depth = i32::try_from(depth).unwrap_or(i32::MAX);
    footprint
        .bottom_columns()
        .into_iter()
        .filter_map(|point| {
            let start = BlockPos::containing(point);
            (0..=depth)
                .map(|dy| start.offset_y(-dy))
                .find(|cell| world.block_at(*cell).catches_fall())
                .map(|cell| (point.y - cell.top()).max(0.0))
        })
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockKind, VoxelGrid};
    use glam::DVec3;
    use rstest::rstest;

    fn body(feet: DVec3) -> Aabb {
        Aabb::standing_at(feet, 0.6, 1.8)
    }

    #[rstest]
    fn nearest_column_wins() {
        let mut world = VoxelGrid::new();
        world.fill_layer(40, (-2, 2), (-2, 2), BlockKind::Stone);
        world.set(BlockPos::new(1, 45, 1), BlockKind::Dirt);
        let height = height_above_ground(&world, &body(DVec3::new(0.9, 50.0, 0.9)), 32);
        assert_eq!(height, Some(4.0));
    }

    #[rstest]
    fn water_counts_as_ground() {
        let mut world = VoxelGrid::new();
        world.set(BlockPos::new(0, 30, 0), BlockKind::Water);
        let height = height_above_ground(&world, &body(DVec3::new(0.5, 33.0, 0.5)), 8);
        assert_eq!(height, Some(2.0));
    }

    #[rstest]
    fn base_inside_catching_cell_is_zero() {
        let mut world = VoxelGrid::new();
        world.set(BlockPos::new(0, 30, 0), BlockKind::Cobweb);
        let height = height_above_ground(&world, &body(DVec3::new(0.5, 30.4, 0.5)), 8);
        assert_eq!(height, Some(0.0));
    }
}
