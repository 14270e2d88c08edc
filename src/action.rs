//! The single side-effecting collaborator: deploying a countermeasure.

use glam::DVec3;

use crate::entity::ItemKind;
use crate::geometry::BlockPos;

/// Issues placement actions to the host world.
///
/// Implementations may be slow or fail; the orchestrator calls each method
/// at most once per fall session and never retries within it.
pub trait ActionExecutor {
    /// Places `item` against `target_block`, aiming at `target_position`.
    ///
    /// Returns whether the host reports success.
    fn attempt_placement(&mut self, target_block: BlockPos, target_position: DVec3, item: ItemKind)
        -> bool;

    /// Picks a previously placed countermeasure back up.
    ///
    /// The default does nothing and reports failure.
    fn recover_placement(&mut self, placed_at: BlockPos, item: ItemKind) -> bool {
        let _ = (placed_at, item);
        false
    }
}
