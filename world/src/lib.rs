#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for Outpost.
//!
//! [`Game`] owns every entity on the board, keeps the spatial index and the
//! path finder in step, resolves submitted commands through a fixed phase
//! pipeline and replays foreign action lists for replicas.

mod entity;
mod error;
mod history;
mod index;
mod pathfinding;
mod replay;
mod resolve;
mod team;

pub mod config;
pub mod generation;
pub mod query;
pub mod snapshot;

use std::collections::BTreeMap;

use outpost_core::{EntityId, Position, TeamId, UnitKind, UnitSettings};

pub use entity::{Entity, Food, Unit, Wall};
pub use error::{PlacementError, ProtocolError, SnapshotError};
pub use history::History;
pub use pathfinding::{PathFinder, WalkGrid};
pub use team::Team;

use index::SpatialIndex;

/// Complete state of one match.
#[derive(Clone, Debug)]
pub struct Game {
    width: u32,
    height: u32,
    turn: u32,
    max_turns: u32,
    max_pop: u32,
    teams: BTreeMap<TeamId, Team>,
    entities: BTreeMap<EntityId, Entity>,
    index: SpatialIndex,
    history: History,
    next_entity_id: u32,
}

impl Game {
    /// Creates an empty board without teams.
    #[must_use]
    pub fn new(width: u32, height: u32, max_turns: u32, max_pop: u32) -> Self {
        Self {
            width,
            height,
            turn: 0,
            max_turns,
            max_pop,
            teams: BTreeMap::new(),
            entities: BTreeMap::new(),
            index: SpatialIndex::new(width, height),
            history: History::new(),
            next_entity_id: 1,
        }
    }

    /// Registers a team together with its headquarters anchored at
    /// `headquarters_position`, returning the headquarters id.
    pub fn add_team(
        &mut self,
        id: TeamId,
        color: impl Into<String>,
        food_count: u32,
        settings: UnitSettings,
        headquarters_position: Position,
    ) -> Result<EntityId, PlacementError> {
        if self.teams.contains_key(&id) {
            return Err(PlacementError::DuplicateTeam(id));
        }

        let headquarters = Unit::new(
            EntityId::new(self.next_entity_id),
            id,
            UnitKind::Headquarters,
            *settings.stats(UnitKind::Headquarters),
            headquarters_position,
        );
        self.place_unit(headquarters)?;
        let headquarters_id = self.allocate_id();

        let _ = self.teams.insert(
            id,
            Team::new(
                id,
                color.into(),
                food_count,
                headquarters_id,
                headquarters_position,
                settings,
            ),
        );
        Ok(headquarters_id)
    }

    /// Places a wall.
    pub fn add_wall(&mut self, position: Position) -> Result<EntityId, PlacementError> {
        let id = EntityId::new(self.next_entity_id);
        self.place_wall(id, position)?;
        Ok(self.allocate_id())
    }

    /// Places a loose food item.
    pub fn add_food(&mut self, position: Position) -> Result<EntityId, PlacementError> {
        let id = EntityId::new(self.next_entity_id);
        self.place_food(Food::new(id, position))?;
        Ok(self.allocate_id())
    }

    /// Places a citizen or fighter at full health for an existing team.
    pub fn add_unit(
        &mut self,
        team: TeamId,
        kind: UnitKind,
        position: Position,
    ) -> Result<EntityId, PlacementError> {
        if matches!(kind, UnitKind::Headquarters) {
            return Err(PlacementError::Headquarters);
        }
        let stats = *self
            .teams
            .get(&team)
            .ok_or(PlacementError::UnknownTeam(team))?
            .settings()
            .stats(kind);
        let id = EntityId::new(self.next_entity_id);
        self.place_unit(Unit::new(id, team, kind, stats, position))?;
        Ok(self.allocate_id())
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    fn check_cells(&self, cells: &[Position]) -> Result<(), PlacementError> {
        for cell in cells {
            if !self.in_bounds(*cell) {
                return Err(PlacementError::OutOfBounds(*cell));
            }
            if !self.index.is_free(*cell) {
                return Err(PlacementError::Occupied(*cell));
            }
        }
        Ok(())
    }

    pub(crate) fn place_wall(&mut self, id: EntityId, position: Position) -> Result<(), PlacementError> {
        self.check_cells(&[position])?;
        if self.index.loose_food(position).is_some() {
            return Err(PlacementError::FoodPresent(position));
        }
        self.index.occupy(id, &[position]);
        let _ = self.entities.insert(id, Entity::Wall(Wall::new(id, position)));
        Ok(())
    }

    pub(crate) fn place_unit(&mut self, unit: Unit) -> Result<(), PlacementError> {
        let cells = unit.covering();
        self.check_cells(&cells)?;
        self.index.occupy(unit.id(), &cells);
        let _ = self.entities.insert(unit.id(), Entity::Unit(unit));
        Ok(())
    }

    /// Places loose food; carried food is linked by the caller.
    pub(crate) fn place_food(&mut self, food: Food) -> Result<(), PlacementError> {
        let position = food.position();
        if !self.in_bounds(position) {
            return Err(PlacementError::OutOfBounds(position));
        }
        if food.is_loose() {
            if let Some(Entity::Wall(_)) = self.occupant(position) {
                return Err(PlacementError::Occupied(position));
            }
            if self.index.loose_food(position).is_some() {
                return Err(PlacementError::FoodPresent(position));
            }
            self.index.place_food(food.id(), position);
        }
        let _ = self.entities.insert(food.id(), Entity::Food(food));
        Ok(())
    }

    /// Board width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of resolved turns.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Turn after which the match ends regardless of the board.
    #[must_use]
    pub const fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Maximum number of citizens and fighters per team.
    #[must_use]
    pub const fn max_pop(&self) -> u32 {
        self.max_pop
    }

    /// Identifier the next created entity receives.
    #[must_use]
    pub const fn next_entity_id(&self) -> EntityId {
        EntityId::new(self.next_entity_id)
    }

    /// Ledger of every resolved turn.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Board-wide walkability state.
    #[must_use]
    pub fn pathfinder(&self) -> &PathFinder {
        self.index.pathfinder()
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn in_bounds(&self, cell: Position) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && i64::from(cell.x()) < i64::from(self.width)
            && i64::from(cell.y()) < i64::from(self.height)
    }

    /// Teams in id order.
    pub fn teams(&self) -> impl Iterator<Item = &Team> + '_ {
        self.teams.values()
    }

    /// Looks up a team.
    #[must_use]
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Looks up any entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Looks up a unit.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.entities.get(&id).and_then(Entity::as_unit)
    }

    /// Looks up a food item.
    #[must_use]
    pub fn food(&self, id: EntityId) -> Option<&Food> {
        self.entities.get(&id).and_then(Entity::as_food)
    }

    pub(crate) fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.entities.get_mut(&id).and_then(Entity::as_unit_mut)
    }

    pub(crate) fn food_mut(&mut self, id: EntityId) -> Option<&mut Food> {
        self.entities.get_mut(&id).and_then(Entity::as_food_mut)
    }

    /// Every live unit in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.entities.values().filter_map(Entity::as_unit)
    }

    /// Live citizens of `team` in id order.
    pub fn citizens(&self, team: TeamId) -> impl Iterator<Item = &Unit> + '_ {
        self.units()
            .filter(move |unit| unit.team() == team && unit.is_citizen())
    }

    /// Live fighters of `team` in id order.
    pub fn fighters(&self, team: TeamId) -> impl Iterator<Item = &Unit> + '_ {
        self.units()
            .filter(move |unit| unit.team() == team && unit.is_fighter())
    }

    /// The team's headquarters while it stands.
    #[must_use]
    pub fn headquarters(&self, team: TeamId) -> Option<&Unit> {
        self.teams
            .get(&team)
            .and_then(|record| self.unit(record.headquarters()))
            .filter(|unit| unit.is_alive())
    }

    /// Every wall in id order.
    pub fn walls(&self) -> impl Iterator<Item = &Wall> + '_ {
        self.entities.values().filter_map(|entity| match entity {
            Entity::Wall(wall) => Some(wall),
            _ => None,
        })
    }

    /// Every food item, loose or carried, in id order.
    pub fn foods(&self) -> impl Iterator<Item = &Food> + '_ {
        self.entities.values().filter_map(Entity::as_food)
    }

    /// Blocking entity registered on `cell`.
    #[must_use]
    pub fn occupant(&self, cell: Position) -> Option<&Entity> {
        self.index
            .occupant(cell)
            .and_then(|id| self.entities.get(&id))
    }

    /// Loose food lying on `cell`.
    #[must_use]
    pub fn loose_food_at(&self, cell: Position) -> Option<&Food> {
        self.index.loose_food(cell).and_then(|id| self.food(id))
    }

    /// Every registered blocking cell with its owner, sorted by cell.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<(Position, EntityId)> {
        let mut cells: Vec<_> = self.index.occupied_cells().collect();
        cells.sort_unstable();
        cells
    }

    /// Every cell holding loose food with the food id, sorted by cell.
    #[must_use]
    pub fn loose_food_cells(&self) -> Vec<(Position, EntityId)> {
        let mut cells: Vec<_> = self.index.loose_food_cells().collect();
        cells.sort_unstable();
        cells
    }

    /// Live citizens and fighters of `team`.
    #[must_use]
    pub fn population(&self, team: TeamId) -> u32 {
        let count = self
            .units()
            .filter(|unit| unit.team() == team && unit.kind().counts_toward_population())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Walkability grid as seen by `team`: shared blocking state with the
    /// team's own headquarters cells opened up.
    #[must_use]
    pub fn team_grid(&self, team: TeamId) -> WalkGrid {
        let headquarters_cells = self
            .headquarters(team)
            .map(Unit::covering)
            .unwrap_or_default();
        self.pathfinder().grid_for_team(&headquarters_cells)
    }

    /// Shortest path for `unit` to `destination` on its team grid, starting
    /// with the unit's own cell.
    #[must_use]
    pub fn get_path(&self, unit: EntityId, destination: Position) -> Option<Vec<Position>> {
        let unit = self.unit(unit)?;
        self.team_grid(unit.team())
            .path(unit.position(), destination)
    }

    /// Every reachable path for `unit`, one per reachable destination.
    #[must_use]
    pub fn get_paths(&self, unit: EntityId, destinations: &[Position]) -> Vec<Vec<Position>> {
        self.unit(unit).map_or_else(Vec::new, |unit| {
            self.team_grid(unit.team())
                .paths(unit.position(), destinations)
        })
    }

    /// Reports whether the match has ended: a headquarters fell or the turn
    /// limit was reached.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.turn >= self.max_turns
            || self
                .teams
                .keys()
                .any(|team| self.headquarters(*team).is_none())
    }

    /// The sole team whose headquarters survived a match in which another
    /// headquarters fell.
    #[must_use]
    pub fn winner(&self) -> Option<TeamId> {
        if !self.is_over() {
            return None;
        }
        let standing: Vec<TeamId> = self
            .teams
            .keys()
            .copied()
            .filter(|team| self.headquarters(*team).is_some())
            .collect();
        match standing.as_slice() {
            [survivor] if self.teams.len() > 1 => Some(*survivor),
            _ => None,
        }
    }
}
