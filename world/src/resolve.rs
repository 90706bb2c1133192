//! Command validation and the phase-ordered turn pipeline.

use std::collections::HashSet;

use outpost_core::{
    Action, ActionError, Command, CommandKind, Effect, EntityId, Phase, Position, TeamId,
    UnitKind,
};
use tracing::{debug, info};

use crate::{entity::Entity, Game, Unit};

/// Bookkeeping for the turn that is currently being resolved.
#[derive(Debug, Default)]
struct TurnLedger {
    committed: HashSet<EntityId>,
    fallen: HashSet<EntityId>,
}

/// Splits commands into phase queues, keeping the first command a unit
/// submits for each phase.
fn bucket(commands: &[Command]) -> [Vec<&Command>; Phase::ORDER.len()] {
    let mut queues: [Vec<&Command>; Phase::ORDER.len()] = Default::default();
    let mut seen = HashSet::new();

    for command in commands {
        let phase = command.command_type().phase();
        if seen.insert((command.unit, phase)) {
            queues[phase.index()].push(command);
        } else {
            debug!(unit = %command.unit, ?phase, "dropping duplicate command for phase");
        }
    }

    queues
}

impl Game {
    /// Resolves one turn of commands.
    ///
    /// Returns `None` without touching the state once the game is over.
    /// Otherwise the turn counter advances, commands run phase by phase in
    /// submission order, and every produced action is recorded in history
    /// and returned. A unit commits at most one successful action per turn;
    /// later commands for it are dropped silently.
    pub fn execute_turn(&mut self, commands: &[Command]) -> Option<Vec<Action>> {
        if self.is_over() {
            return None;
        }

        self.turn += 1;
        let queues = bucket(commands);
        let mut ledger = TurnLedger::default();
        let mut actions = Vec::new();

        for phase in Phase::ORDER {
            for command in &queues[phase.index()] {
                if ledger.committed.contains(&command.unit) {
                    debug!(
                        turn = self.turn,
                        unit = %command.unit,
                        command = ?command.command_type(),
                        "unit already acted this turn"
                    );
                    continue;
                }

                let action = match self.resolve(&ledger, command) {
                    Ok(Some(effect)) => {
                        self.apply_effect(command.unit, &effect);
                        if let Effect::Attack {
                            target,
                            destroyed: true,
                            ..
                        } = effect
                        {
                            let _ = ledger.fallen.insert(target);
                        }
                        let _ = ledger.committed.insert(command.unit);
                        Action::succeeded(command.unit, effect)
                    }
                    Ok(None) => {
                        debug!(turn = self.turn, unit = %command.unit, "attack target out of reach");
                        continue;
                    }
                    Err(error) => Action::failed(command.unit, command.command_type(), error),
                };

                debug!(
                    turn = self.turn,
                    unit = %action.unit,
                    outcome = ?action.outcome,
                    "resolved command"
                );
                actions.push(action);
            }
        }

        self.history.record(self.turn, actions.clone());
        if self.is_over() {
            info!(turn = self.turn, winner = ?self.winner(), "game over");
        }
        Some(actions)
    }

    /// Cells `unit` could legally move to this turn.
    #[must_use]
    pub fn valid_moves(&self, unit: EntityId) -> Vec<Position> {
        let Some(unit) = self.unit(unit) else {
            return Vec::new();
        };
        let speed = unit.stats().speed;
        let grid = self.team_grid(unit.team());
        unit.position()
            .adjacents_within_distance(speed)
            .into_iter()
            .filter(|cell| self.check_destination(unit, *cell).is_ok())
            .filter(|cell| {
                grid.path(unit.position(), *cell)
                    .map_or(false, |path| within_reach(&path, speed))
            })
            .collect()
    }

    fn resolve(&self, ledger: &TurnLedger, command: &Command) -> Result<Option<Effect>, ActionError> {
        let actor = self.live_unit(ledger, command.unit)?;

        match &command.kind {
            CommandKind::Attack { target } => self.resolve_attack(ledger, actor, *target),
            CommandKind::Move {
                destination,
                auto_pick_up_food,
                auto_drop_off_food,
            } => self
                .resolve_move(actor, *destination, *auto_pick_up_food, *auto_drop_off_food)
                .map(Some),
            CommandKind::SpawnCitizen { position } => self
                .resolve_spawn(actor, UnitKind::Citizen, *position)
                .map(Some),
            CommandKind::SpawnFighter { kind, position } => self
                .resolve_spawn(actor, UnitKind::Fighter(*kind), *position)
                .map(Some),
            CommandKind::PickUpFood { food } => self.resolve_pick_up(actor, *food).map(Some),
            CommandKind::DropOffFood { position } => {
                self.resolve_drop_off(actor, *position).map(Some)
            }
        }
    }

    fn live_unit(&self, ledger: &TurnLedger, id: EntityId) -> Result<&Unit, ActionError> {
        if ledger.fallen.contains(&id) {
            return Err(ActionError::UnitDead(id));
        }
        match self.unit(id) {
            Some(unit) if unit.is_alive() => Ok(unit),
            Some(_) => Err(ActionError::UnitDead(id)),
            None => Err(ActionError::UnitNotFound(id)),
        }
    }

    fn resolve_attack(
        &self,
        ledger: &TurnLedger,
        attacker: &Unit,
        target_id: EntityId,
    ) -> Result<Option<Effect>, ActionError> {
        if ledger.fallen.contains(&target_id) {
            return Err(ActionError::TargetDead(target_id));
        }
        let target = match self.entity(target_id) {
            None => return Err(ActionError::TargetNotFound(target_id)),
            Some(Entity::Unit(unit)) => unit,
            Some(_) => return Err(ActionError::NotAttackable(target_id)),
        };
        if !target.is_alive() {
            return Err(ActionError::TargetDead(target_id));
        }
        if target.team() == attacker.team() {
            return Err(ActionError::FriendlyTarget(target_id));
        }

        if attacker.distance_to(target) <= attacker.stats().range {
            let damage = attacker.damage_against(target);
            return Ok(Some(Effect::Attack {
                target: target_id,
                damage,
                destroyed: target.hp() <= i64::from(damage),
            }));
        }

        if attacker.is_headquarters() {
            return Ok(None);
        }
        if attacker.stats().speed == 0 {
            return Err(ActionError::TargetOutOfRange(target_id));
        }
        self.approach(attacker, target).map(Some)
    }

    /// Free cells from which `attacker` would have `target` in range.
    fn attack_positions(&self, attacker: &Unit, target: &Unit) -> Vec<Position> {
        let range = attacker.stats().range;
        let mut seen = HashSet::new();
        let mut positions = Vec::new();

        for cell in target.covering() {
            for candidate in cell.adjacents_within_distance(range) {
                if target.footprint().contains(target.position(), candidate)
                    || !seen.insert(candidate)
                {
                    continue;
                }
                if self.in_bounds(candidate) && self.index.is_free(candidate) {
                    positions.push(candidate);
                }
            }
        }

        positions
    }

    /// Attack down-converted into a move along the shortest path toward the
    /// closest reachable attack position.
    fn approach(&self, attacker: &Unit, target: &Unit) -> Result<Effect, ActionError> {
        let unreachable = ActionError::Unreachable(target.position());
        let positions = self.attack_positions(attacker, target);
        let path = self
            .team_grid(attacker.team())
            .shortest_path(attacker.position(), &positions)
            .ok_or_else(|| unreachable.clone())?;

        let speed = usize::try_from(attacker.stats().speed).unwrap_or(usize::MAX);
        let reach = speed.min(path.len().saturating_sub(1));
        let destination = path
            .get(1..=reach)
            .unwrap_or_default()
            .iter()
            .rev()
            .copied()
            .find(|cell| self.index.is_free(*cell))
            .ok_or(unreachable)?;

        Ok(Effect::Move {
            from: attacker.position(),
            to: destination,
            picked_up_food: None,
            deposited_food: None,
        })
    }

    fn check_destination(&self, unit: &Unit, destination: Position) -> Result<(), ActionError> {
        if !self.in_bounds(destination) {
            return Err(ActionError::OutOfBounds(destination));
        }
        match self.occupant(destination) {
            None => Ok(()),
            Some(Entity::Wall(_)) => Err(ActionError::Wall(destination)),
            Some(Entity::Unit(other)) if other.is_headquarters() && other.team() != unit.team() => {
                Err(ActionError::EnemyHeadquarters(destination))
            }
            Some(_) => Err(ActionError::Occupied(destination)),
        }
    }

    fn resolve_move(
        &self,
        unit: &Unit,
        destination: Position,
        auto_pick_up_food: bool,
        auto_drop_off_food: bool,
    ) -> Result<Effect, ActionError> {
        let speed = unit.stats().speed;
        if speed == 0 {
            return Err(ActionError::Immobile(unit.id()));
        }
        self.check_destination(unit, destination)?;

        let reachable = self
            .team_grid(unit.team())
            .path(unit.position(), destination)
            .map_or(false, |path| within_reach(&path, speed));
        if !reachable {
            return Err(ActionError::Unreachable(destination));
        }

        let picked_up_food = if auto_pick_up_food && unit.is_citizen() && unit.carrying().is_none() {
            self.index.loose_food(destination)
        } else {
            None
        };
        let deposited_food = match unit.carrying() {
            Some(food) if auto_drop_off_food && self.is_drop_off_cell(unit.team(), destination) => {
                Some(food)
            }
            _ => None,
        };

        Ok(Effect::Move {
            from: unit.position(),
            to: destination,
            picked_up_food,
            deposited_food,
        })
    }

    fn is_drop_off_cell(&self, team: TeamId, cell: Position) -> bool {
        self.headquarters(team).map_or(false, |headquarters| {
            headquarters
                .footprint()
                .distance_to(headquarters.position(), cell)
                == 1
        })
    }

    fn resolve_spawn(
        &self,
        headquarters: &Unit,
        kind: UnitKind,
        requested: Option<Position>,
    ) -> Result<Effect, ActionError> {
        let team = match self.team(headquarters.team()) {
            Some(team) if headquarters.is_headquarters() => team,
            _ => return Err(ActionError::NotHeadquarters(headquarters.id())),
        };

        if self.population(team.id()) >= self.max_pop {
            return Err(ActionError::PopulationCap { cap: self.max_pop });
        }

        let ring = headquarters.footprint().ring(headquarters.position());
        let position = match requested {
            Some(cell) => {
                if !ring.contains(&cell) {
                    return Err(ActionError::InvalidSpawnPosition(cell));
                }
                if !self.in_bounds(cell) {
                    return Err(ActionError::OutOfBounds(cell));
                }
                if !self.index.is_free(cell) {
                    return Err(ActionError::Occupied(cell));
                }
                cell
            }
            None => ring
                .into_iter()
                .find(|cell| self.in_bounds(*cell) && self.index.is_free(*cell))
                .ok_or(ActionError::NoSpawnPosition)?,
        };

        let cost = team.settings().stats(kind).cost;
        if team.food_count() < cost {
            return Err(ActionError::InsufficientFood {
                required: cost,
                available: team.food_count(),
            });
        }

        Ok(Effect::Spawn {
            unit: self.next_entity_id(),
            kind,
            position,
            cost,
        })
    }

    fn resolve_pick_up(&self, citizen: &Unit, food_id: EntityId) -> Result<Effect, ActionError> {
        if !citizen.is_citizen() {
            return Err(ActionError::NotCitizen(citizen.id()));
        }
        if citizen.carrying().is_some() {
            return Err(ActionError::AlreadyCarrying(citizen.id()));
        }
        let food = self
            .food(food_id)
            .ok_or(ActionError::FoodNotFound(food_id))?;
        if !food.is_loose() {
            return Err(ActionError::FoodClaimed(food_id));
        }
        if !food.position().is_adjacent_to(citizen.position()) {
            return Err(ActionError::NotAdjacent(food.position()));
        }

        Ok(Effect::PickUpFood {
            food: food_id,
            from: food.position(),
        })
    }

    fn resolve_drop_off(&self, citizen: &Unit, position: Position) -> Result<Effect, ActionError> {
        if !citizen.is_citizen() {
            return Err(ActionError::NotCitizen(citizen.id()));
        }
        let food = citizen
            .carrying()
            .ok_or(ActionError::NotCarrying(citizen.id()))?;
        if !position.is_adjacent_to(citizen.position()) {
            return Err(ActionError::NotAdjacent(position));
        }
        if !self.in_bounds(position) {
            return Err(ActionError::OutOfBounds(position));
        }

        let deposited = self
            .headquarters(citizen.team())
            .map_or(false, |headquarters| {
                headquarters
                    .footprint()
                    .contains(headquarters.position(), position)
            });
        if !deposited {
            match self.occupant(position) {
                None => {}
                Some(Entity::Wall(_)) => return Err(ActionError::Wall(position)),
                Some(Entity::Unit(other)) if other.is_headquarters() => {
                    return Err(ActionError::EnemyHeadquarters(position));
                }
                Some(_) => return Err(ActionError::Occupied(position)),
            }
            if self.index.loose_food(position).is_some() {
                return Err(ActionError::FoodPresent(position));
            }
        }

        Ok(Effect::DropOffFood {
            food,
            position,
            deposited,
        })
    }
}

fn within_reach(path: &[Position], speed: u32) -> bool {
    u32::try_from(path.len().saturating_sub(1)).map_or(false, |steps| steps <= speed)
}
