//! Voxel coordinates and axis-aligned boxes.
//!
//! Positions and velocities are plain [`glam::DVec3`] values with `y` pointing
//! up. [`BlockPos`] addresses a single cell of the voxel grid and [`Aabb`]
//! describes an entity's bounding volume.

use std::fmt;

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::numeric::floor_to_i32;
use crate::FOOTPRINT_INSET;

/// Integer address of one voxel cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// East/west cell index.
    pub x: i32,
    /// Vertical cell index.
    pub y: i32,
    /// North/south cell index.
    pub z: i32,
}

impl BlockPos {
    /// Creates a block coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the cell containing `point`.
    ///
    /// # Examples
    /// ```
    /// use glam::DVec3;
    /// use softfall::BlockPos;
    /// let cell = BlockPos::containing(DVec3::new(-0.5, 64.0, 2.9));
    /// assert_eq!(cell, BlockPos::new(-1, 64, 2));
    /// ```
    #[must_use]
    pub fn containing(point: DVec3) -> Self {
        Self {
            x: floor_to_i32(point.x),
            y: floor_to_i32(point.y),
            z: floor_to_i32(point.z),
        }
    }

    /// Returns the cell directly above this one.
    #[must_use]
    pub const fn above(self) -> Self {
        Self {
            y: self.y.saturating_add(1),
            ..self
        }
    }

    /// Returns the cell directly below this one.
    #[must_use]
    pub const fn below(self) -> Self {
        Self {
            y: self.y.saturating_sub(1),
            ..self
        }
    }

    /// Returns the cell offset vertically by `dy`.
    #[must_use]
    pub const fn offset_y(self, dy: i32) -> Self {
        Self {
            y: self.y.saturating_add(dy),
            ..self
        }
    }

    /// Centre point of the cell.
    #[must_use]
    pub fn centre(self) -> DVec3 {
        DVec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// Height of the cell's top face.
    #[must_use]
    pub fn top(self) -> f64 {
        f64::from(self.y) + 1.0
    }

    /// Horizontal distance from the cell centre to `point`, ignoring `y`.
    #[must_use]
    pub fn horizontal_distance(self, point: DVec3) -> f64 {
        let centre = self.centre();
        (centre.x - point.x).hypot(centre.z - point.z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(pos: BlockPos) -> Self {
        Self::new(pos.x, pos.y, pos.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Lowest corner.
    pub min: DVec3,
    /// Highest corner.
    pub max: DVec3,
}

impl Aabb {
    /// Creates a box from two corners, normalising their order.
    #[must_use]
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of the given width and height standing on `feet`.
    ///
    /// # Examples
    /// ```
    /// use glam::DVec3;
    /// use softfall::Aabb;
    /// let body = Aabb::standing_at(DVec3::new(0.5, 70.0, 0.5), 0.6, 1.8);
    /// assert!((body.min.x - 0.2).abs() < 1e-9);
    /// assert!((body.max.y - 71.8).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn standing_at(feet: DVec3, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self {
            min: DVec3::new(feet.x - half, feet.y, feet.z - half),
            max: DVec3::new(feet.x + half, feet.y + height, feet.z + half),
        }
    }

    /// Centre of the bottom face.
    #[must_use]
    pub fn bottom_centre(&self) -> DVec3 {
        DVec3::new(
            (self.min.x + self.max.x) / 2.0,
            self.min.y,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Thirteen sample points on the bottom face.
    ///
    /// Order: centre, four corners, four edge midpoints, four quarter points.
    /// Corners are pulled inwards by [`FOOTPRINT_INSET`] so a box whose edge
    /// sits on a cell boundary never samples the neighbouring column.
    #[must_use]
    pub fn bottom_samples(&self) -> [DVec3; 13] {
        let y = self.min.y;
        let inset_x = FOOTPRINT_INSET.min((self.max.x - self.min.x) / 2.0);
        let inset_z = FOOTPRINT_INSET.min((self.max.z - self.min.z) / 2.0);
        let x0 = self.min.x + inset_x;
        let x1 = self.max.x - inset_x;
        let z0 = self.min.z + inset_z;
        let z1 = self.max.z - inset_z;
        let cx = (x0 + x1) / 2.0;
        let cz = (z0 + z1) / 2.0;
        let qx0 = (x0 + cx) / 2.0;
        let qx1 = (cx + x1) / 2.0;
        let qz0 = (z0 + cz) / 2.0;
        let qz1 = (cz + z1) / 2.0;
        [
            DVec3::new(cx, y, cz),
            DVec3::new(x0, y, z0),
            DVec3::new(x1, y, z0),
            DVec3::new(x0, y, z1),
            DVec3::new(x1, y, z1),
            DVec3::new(cx, y, z0),
            DVec3::new(cx, y, z1),
            DVec3::new(x0, y, cz),
            DVec3::new(x1, y, cz),
            DVec3::new(qx0, y, qz0),
            DVec3::new(qx1, y, qz0),
            DVec3::new(qx0, y, qz1),
            DVec3::new(qx1, y, qz1),
        ]
    }

    /// Centre plus the four corners of the bottom face.
    #[must_use]
    pub fn bottom_columns(&self) -> [DVec3; 5] {
        let [centre, a, b, c, d, ..] = self.bottom_samples();
        [centre, a, b, c, d]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn samples_stay_inside_footprint() {
        let body = Aabb::standing_at(DVec3::new(10.0, 5.0, -3.0), 0.6, 1.8);
        for point in body.bottom_samples() {
            assert!(point.x > body.min.x && point.x < body.max.x);
            assert!(point.z > body.min.z && point.z < body.max.z);
            assert!((point.y - 5.0).abs() < f64::EPSILON);
        }
    }

    #[rstest]
    fn samples_are_distinct() {
        let body = Aabb::standing_at(DVec3::ZERO, 0.6, 1.8);
        let samples = body.bottom_samples();
        for (i, a) in samples.iter().enumerate() {
            for b in samples.iter().skip(i + 1) {
                assert!(a.distance(*b) > 1e-6, "duplicate sample {a:?}");
            }
        }
    }

    #[rstest]
    fn corner_on_boundary_stays_in_column() {
        let body = Aabb::new(DVec3::new(1.0, 0.0, 1.0), DVec3::new(2.0, 1.0, 2.0));
        for point in body.bottom_samples() {
            let cell = BlockPos::containing(point);
            assert_eq!((cell.x, cell.z), (1, 1));
        }
    }

    #[rstest]
    #[case(BlockPos::new(0, 64, 0), BlockPos::new(0, 65, 0))]
    #[case(BlockPos::new(3, i32::MAX, 3), BlockPos::new(3, i32::MAX, 3))]
    fn above_saturates(#[case] start: BlockPos, #[case] expected: BlockPos) {
        assert_eq!(start.above(), expected);
    }
}
