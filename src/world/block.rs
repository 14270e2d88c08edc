//! Block types and the categories that drive landing safety.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownBlockKind;

/// Broad behavioural class of a block with respect to falling entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    /// Air and air-like cells that neither support nor slow an entity.
    Passable,
    /// Fluid that cancels fall damage outright.
    SafeFluid,
    /// Fluid that stops a fall but harms the entity.
    HazardFluid,
    /// Plant that cancels fall damage.
    DamageNegatingPlant,
    /// Block that cancels or greatly reduces fall damage.
    DamageAbsorbing,
    /// Thin layer whose safety depends on what lies beneath it.
    SoftCovering,
    /// Climbable structure that only helps when the entity crouches.
    ClimbableLattice,
    /// Ordinary full block.
    Solid,
}

macro_rules! block_kinds {
    ($($variant:ident => $name:literal, $category:ident, $solid:literal;)*) => {
        /// Closed set of block types known to the prediction engine.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum BlockKind {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl BlockKind {
            /// Every block kind, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Stable lowercase name used in logs and verdict reasons.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Behavioural category of the block.
            #[must_use]
            pub const fn category(self) -> BlockCategory {
                match self {
                    $(Self::$variant => BlockCategory::$category,)*
                }
            }

            /// Whether the block has a collision box that rays stop at.
            #[must_use]
            pub const fn is_solid(self) -> bool {
                match self {
                    $(Self::$variant => $solid,)*
                }
            }
        }
    };
}

block_kinds! {
    Air => "air", Passable, false;
    ShortGrass => "short_grass", Passable, false;
    Torch => "torch", Passable, false;
    Water => "water", SafeFluid, false;
    Lava => "lava", HazardFluid, false;
    SweetBerryBush => "sweet_berry_bush", DamageNegatingPlant, false;
    TwistingVines => "twisting_vines", DamageNegatingPlant, false;
    WeepingVines => "weeping_vines", DamageNegatingPlant, false;
    SlimeBlock => "slime_block", DamageAbsorbing, true;
    HayBale => "hay_bale", DamageAbsorbing, true;
    HoneyBlock => "honey_block", DamageAbsorbing, true;
    PowderSnow => "powder_snow", DamageAbsorbing, false;
    Cobweb => "cobweb", DamageAbsorbing, false;
    Carpet => "carpet", SoftCovering, true;
    SnowLayer => "snow_layer", SoftCovering, true;
    Ladder => "ladder", ClimbableLattice, false;
    Scaffolding => "scaffolding", ClimbableLattice, true;
    Stone => "stone", Solid, true;
    Dirt => "dirt", Solid, true;
    GrassBlock => "grass_block", Solid, true;
    Sand => "sand", Solid, true;
    Gravel => "gravel", Solid, true;
    OakPlanks => "oak_planks", Solid, true;
    Glass => "glass", Solid, true;
    Bedrock => "bedrock", Solid, true;
}

impl BlockKind {
    /// Whether the block stops a falling entity, solid or not.
    #[must_use]
    pub const fn catches_fall(self) -> bool {
        !matches!(self.category(), BlockCategory::Passable)
    }

    /// Whether something can be placed into a cell holding this block.
    #[must_use]
    pub const fn is_replaceable(self) -> bool {
        matches!(self.category(), BlockCategory::Passable)
    }

    /// Whether an entity inside this block takes no fall damage.
    #[must_use]
    pub const fn absorbs_impact(self) -> bool {
        matches!(
            self.category(),
            BlockCategory::SafeFluid
                | BlockCategory::DamageNegatingPlant
                | BlockCategory::DamageAbsorbing
        )
    }
}

impl Default for BlockKind {
    fn default() -> Self {
        Self::Air
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or(UnknownBlockKind(wanted))
    }
}
