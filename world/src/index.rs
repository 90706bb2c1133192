//! Position-keyed occupancy kept in lock-step with the path finder.

use std::collections::HashMap;

use outpost_core::{EntityId, Position};

use crate::pathfinding::PathFinder;

/// Single source of truth for which entity blocks which cell.
///
/// Every blocking registration goes through [`SpatialIndex::occupy`] and
/// [`SpatialIndex::vacate`], which update the path finder in the same call.
#[derive(Clone, Debug)]
pub(crate) struct SpatialIndex {
    occupants: HashMap<Position, EntityId>,
    loose_food: HashMap<Position, EntityId>,
    pathfinder: PathFinder,
}

impl SpatialIndex {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            occupants: HashMap::new(),
            loose_food: HashMap::new(),
            pathfinder: PathFinder::new(width, height),
        }
    }

    pub(crate) fn pathfinder(&self) -> &PathFinder {
        &self.pathfinder
    }

    pub(crate) fn occupant(&self, cell: Position) -> Option<EntityId> {
        self.occupants.get(&cell).copied()
    }

    pub(crate) fn loose_food(&self, cell: Position) -> Option<EntityId> {
        self.loose_food.get(&cell).copied()
    }

    pub(crate) fn is_free(&self, cell: Position) -> bool {
        !self.occupants.contains_key(&cell)
    }

    /// Registers `id` on every cell; the caller guarantees they are free.
    pub(crate) fn occupy(&mut self, id: EntityId, cells: &[Position]) {
        for cell in cells {
            let _ = self.occupants.insert(*cell, id);
            self.pathfinder.block_position(*cell);
        }
    }

    /// Releases every cell registered to `id`.
    pub(crate) fn vacate(&mut self, id: EntityId, cells: &[Position]) {
        for cell in cells {
            if self.occupants.get(cell) == Some(&id) {
                let _ = self.occupants.remove(cell);
                self.pathfinder.clear_position(*cell);
            }
        }
    }

    pub(crate) fn place_food(&mut self, id: EntityId, cell: Position) {
        let _ = self.loose_food.insert(cell, id);
    }

    pub(crate) fn lift_food(&mut self, cell: Position) -> Option<EntityId> {
        self.loose_food.remove(&cell)
    }

    pub(crate) fn occupied_cells(&self) -> impl Iterator<Item = (Position, EntityId)> + '_ {
        self.occupants.iter().map(|(cell, id)| (*cell, *id))
    }

    pub(crate) fn loose_food_cells(&self) -> impl Iterator<Item = (Position, EntityId)> + '_ {
        self.loose_food.iter().map(|(cell, id)| (*cell, *id))
    }
}
