//! Host-side views of the falling entity.
//!
//! The engine never owns the entity. Hosts implement [`EntityState`] over
//! whatever representation they keep and hand a reference to
//! [`Orchestrator::on_tick`](crate::orchestrator::Orchestrator::on_tick).

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::UnknownBlockKind;
use crate::geometry::Aabb;
use crate::world::BlockKind;

/// Items that can be deployed to neutralise a fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Bucket that places a water source.
    WaterBucket,
    /// Placeable block item.
    Block(BlockKind),
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaterBucket => f.write_str("water_bucket"),
            Self::Block(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for ItemKind {
    type Err = UnknownBlockKind;

    /// Parses `water_bucket` or any block name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("water_bucket") {
            Ok(Self::WaterBucket)
        } else {
            s.parse().map(Self::Block)
        }
    }
}

/// Read-only snapshot of the falling entity.
pub trait EntityState {
    /// Feet position.
    fn position(&self) -> DVec3;
    /// Velocity in blocks per tick.
    fn velocity(&self) -> DVec3;
    /// Whether the entity is standing on something.
    fn is_on_ground(&self) -> bool;
    /// Downward distance accumulated since the entity last stood on something.
    fn fall_distance(&self) -> f64;
    /// Bounding box in world coordinates.
    fn footprint(&self) -> Aabb;
    /// Whether `item` is currently in hand.
    fn is_holding(&self, item: ItemKind) -> bool;
    /// Whether `item` is available at all. Defaults to [`Self::is_holding`].
    fn has_item(&self, item: ItemKind) -> bool {
        self.is_holding(item)
    }
    /// Whether the entity is crouched.
    fn is_crouching(&self) -> bool;
}

/// Downward speed of `entity`, zero when it is rising.
#[must_use]
pub fn fall_speed(entity: &dyn EntityState) -> f64 {
    (-entity.velocity().y).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("water_bucket", ItemKind::WaterBucket)]
    #[case(" Slime_Block ", ItemKind::Block(BlockKind::SlimeBlock))]
    fn parses_items(#[case] text: &str, #[case] expected: ItemKind) {
        assert_eq!(text.parse::<ItemKind>().ok(), Some(expected));
        assert!(expected.to_string().parse::<ItemKind>().is_ok());
    }

    #[rstest]
    fn unknown_item_is_rejected() {
        assert!("lava_bucket".parse::<ItemKind>().is_err());
    }
}
