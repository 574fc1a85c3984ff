//! Buffered dirty tiles awaiting re-evaluation.
//!
//! The collision grid reports cells whose geometry or occupancy changed.
//! Reports accumulate here between ticks and are drained exactly once per
//! tick; anything reported while a drain is being processed lands in the
//! fresh buffer left behind and is handled on the following tick.

use std::mem;

use glam::IVec3;
use hashbrown::HashMap;

use crate::backend::{EntityStore, TerrainQuery};
use crate::components::EntityId;

/// Set of grid cells invalidated since the last tick.
#[derive(Debug, Default, Clone)]
pub struct DirtyTiles {
    tiles: HashMap<(i32, i32, i32), IVec3>,
}

impl DirtyTiles {
    /// Record a changed cell. Re-adding a cell is a no-op.
    pub fn mark(&mut self, cell: IVec3) {
        self.tiles.entry(cell.into()).or_insert(cell);
    }

    /// Record every cell in `cells`.
    pub fn extend<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = IVec3>,
    {
        for cell in cells {
            self.mark(cell);
        }
    }

    /// Number of distinct cells waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no cell is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Swap out the accumulated cells, returning them in a stable order.
    pub fn take(&mut self) -> Vec<IVec3> {
        let drained = mem::take(&mut self.tiles);
        let mut cells: Vec<IVec3> = drained.into_values().collect();
        cells.sort_unstable_by_key(|cell| (cell.x, cell.y, cell.z));
        cells
    }
}

/// Entities to re-check for a dirty cell: occupants of the cell itself and of
/// the cell above it, never the world root.
#[must_use]
pub fn affected_entities<W>(world: &W, cell: IVec3) -> Vec<EntityId>
where
    W: TerrainQuery + EntityStore + ?Sized,
{
    let root = world.world_root();
    let mut affected = Vec::new();
    for probe in [cell, cell + IVec3::Y] {
        for entity in world.entities_at(probe) {
            if entity != root && !affected.contains(&entity) {
                affected.push(entity);
            }
        }
    }
    affected
}
