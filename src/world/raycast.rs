//! Voxel traversal along a line segment.
//!
//! Walks every cell the segment passes through in order (Amanatides & Woo),
//! stopping at the first cell accepted by the supplied predicate.

use glam::DVec3;

use crate::geometry::BlockPos;
use crate::MAX_RAYCAST_STEPS;

/// Per-axis traversal state.
#[derive(Debug, Clone, Copy)]
struct AxisWalk {
    step: i32,
    t_max: f64,
    t_delta: f64,
}

impl AxisWalk {
    fn new(origin: f64, delta: f64, cell: i32) -> Self {
        if delta > 0.0 {
            Self {
                step: 1,
                t_max: (f64::from(cell) + 1.0 - origin) / delta,
                t_delta: 1.0 / delta,
            }
        } else if delta < 0.0 {
            Self {
                step: -1,
                t_max: (origin - f64::from(cell)) / -delta,
                t_delta: -1.0 / delta,
            }
        } else {
            Self {
                step: 0,
                t_max: f64::INFINITY,
                t_delta: f64::INFINITY,
            }
        }
    }

    fn advance(&mut self, coord: &mut i32) {
        *coord = coord.saturating_add(self.step);
        self.t_max += self.t_delta;
    }
}

/// Returns the first cell between `from` and `to` for which `hit` is true.
///
/// The start cell is tested first. Traversal is bounded by
/// [`MAX_RAYCAST_STEPS`] so non-finite or enormous segments terminate.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use softfall::world::cast_voxels;
/// use softfall::BlockPos;
///
/// let floor = BlockPos::new(0, 60, 0);
/// let hit = cast_voxels(
///     DVec3::new(0.5, 64.0, 0.5),
///     DVec3::new(0.5, 59.0, 0.5),
///     |cell| cell == floor,
/// );
/// assert_eq!(hit, Some(floor));
/// ```
pub fn cast_voxels<F>(from: DVec3, to: DVec3, mut hit: F) -> Option<BlockPos>
where
    F: FnMut(BlockPos) -> bool,
{
    if !from.is_finite() || !to.is_finite() {
        return None;
    }

    let delta = to - from;
    let mut cell = BlockPos::containing(from);
    let end = BlockPos::containing(to);

    let mut walk_x = AxisWalk::new(from.x, delta.x, cell.x);
    let mut walk_y = AxisWalk::new(from.y, delta.y, cell.y);
    let mut walk_z = AxisWalk::new(from.z, delta.z, cell.z);

    for _ in 0..MAX_RAYCAST_STEPS {
        if hit(cell) {
            return Some(cell);
        }
        if cell == end {
            return None;
        }

        let next_t = walk_x.t_max.min(walk_y.t_max).min(walk_z.t_max);
        if next_t > 1.0 {
            return None;
        }
        if walk_x.t_max <= walk_y.t_max && walk_x.t_max <= walk_z.t_max {
            walk_x.advance(&mut cell.x);
        } else if walk_y.t_max <= walk_z.t_max {
            walk_y.advance(&mut cell.y);
        } else {
            walk_z.advance(&mut cell.z);
        }
    }
    None
}
