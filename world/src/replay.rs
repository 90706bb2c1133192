//! Effect application shared by turn resolution and replay.

use outpost_core::{Action, Effect, EntityId, Position, UnitKind};
use tracing::{debug, info, warn};

use crate::{Game, ProtocolError, Unit};

impl Game {
    /// Replays a turn resolved by another instance.
    ///
    /// The turn must directly follow the current one and must not be in
    /// history yet. Effects of successful actions are applied in order
    /// without validation; the complete list, failures included, is then
    /// recorded. On error the game is left untouched.
    pub fn import_turn(&mut self, turn: u32, actions: Vec<Action>) -> Result<(), ProtocolError> {
        if self.history.contains(turn) {
            warn!(turn, "rejecting import of a recorded turn");
            return Err(ProtocolError::TurnAlreadyRecorded(turn));
        }
        let expected = self.turn.saturating_add(1);
        if self.turn.checked_add(1) != Some(turn) {
            warn!(turn, expected, "rejecting out-of-sequence turn");
            return Err(ProtocolError::NonSequentialTurn {
                expected,
                received: turn,
            });
        }
        if self.is_over() {
            warn!(turn, "rejecting import into a finished game");
            return Err(ProtocolError::GameOver(turn));
        }

        self.turn = turn;
        for action in &actions {
            if let Some(effect) = action.effect() {
                self.apply_effect(action.unit, effect);
            }
        }
        self.history.record(turn, actions);

        if self.is_over() {
            info!(turn, winner = ?self.winner(), "game over");
        }
        Ok(())
    }

    /// Applies a resolved effect issued by `actor`.
    pub(crate) fn apply_effect(&mut self, actor: EntityId, effect: &Effect) {
        match *effect {
            Effect::Attack { target, damage, .. } => self.apply_damage(target, damage),
            Effect::Move {
                to,
                picked_up_food,
                deposited_food,
                ..
            } => {
                self.relocate_unit(actor, to);
                if let Some(food) = picked_up_food {
                    self.attach_food(actor, food);
                }
                if let Some(food) = deposited_food {
                    self.deposit_food(actor, food);
                }
            }
            Effect::Spawn {
                unit,
                kind,
                position,
                cost,
            } => self.spawn_unit(actor, unit, kind, position, cost),
            Effect::PickUpFood { food, .. } => self.attach_food(actor, food),
            Effect::DropOffFood {
                food,
                position,
                deposited,
            } => {
                if deposited {
                    self.deposit_food(actor, food);
                } else {
                    self.release_food(actor, food, position);
                }
            }
        }
    }

    fn apply_damage(&mut self, target: EntityId, damage: u32) {
        let Some(unit) = self.unit_mut(target) else {
            warn!(unit = %target, "damage for unknown unit");
            return;
        };
        if unit.take_damage(damage) {
            self.remove_unit(target);
        }
    }

    /// Deregisters a dead unit from the index, the path finder and the arena.
    fn remove_unit(&mut self, id: EntityId) {
        let Some(unit) = self.unit(id).copied() else {
            return;
        };
        let _ = self.entities.remove(&id);
        self.index.vacate(id, &unit.covering());

        if let Some(food) = unit.carrying() {
            match self.landing_cell(unit.position()) {
                Some(cell) => {
                    if let Some(item) = self.food_mut(food) {
                        item.release(cell);
                    }
                    self.index.place_food(food, cell);
                }
                None => {
                    let _ = self.entities.remove(&food);
                    debug!(
                        food = %food,
                        carrier = %id,
                        "carried food lost with no free cell nearby"
                    );
                }
            }
        }

        debug!(unit = %id, kind = %unit.kind(), team = %unit.team(), "unit destroyed");
    }

    /// Cell where a fallen carrier's food comes to rest: its own cell, else
    /// the first free neighbour in N, E, S, W order.
    fn landing_cell(&self, cell: Position) -> Option<Position> {
        std::iter::once(cell)
            .chain(cell.adjacents())
            .find(|candidate| {
                self.in_bounds(*candidate)
                    && self.index.is_free(*candidate)
                    && self.index.loose_food(*candidate).is_none()
            })
    }

    fn relocate_unit(&mut self, id: EntityId, to: Position) {
        let Some(unit) = self.unit_mut(id) else {
            warn!(unit = %id, "move for unknown unit");
            return;
        };
        let footprint = unit.footprint();
        let from = unit.position();
        let carrying = unit.carrying();
        unit.relocate(to);

        self.index.vacate(id, &footprint.covering(from));
        self.index.occupy(id, &footprint.covering(to));
        if let Some(food) = carrying.and_then(|food| self.food_mut(food)) {
            food.follow(to);
        }
    }

    fn attach_food(&mut self, carrier: EntityId, food: EntityId) {
        let Some(position) = self.unit(carrier).map(Unit::position) else {
            warn!(unit = %carrier, "pick-up for unknown unit");
            return;
        };
        let Some(item) = self.food_mut(food) else {
            warn!(food = %food, "pick-up of unknown food");
            return;
        };
        let lying = item.position();
        item.attach(carrier, position);

        if self.index.loose_food(lying) == Some(food) {
            let _ = self.index.lift_food(lying);
        }
        if let Some(unit) = self.unit_mut(carrier) {
            unit.set_carrying(Some(food));
        }
    }

    fn deposit_food(&mut self, carrier: EntityId, food: EntityId) {
        let Some(unit) = self.unit_mut(carrier) else {
            warn!(unit = %carrier, "deposit for unknown unit");
            return;
        };
        unit.set_carrying(None);
        let team = unit.team();

        let _ = self.entities.remove(&food);
        if let Some(record) = self.teams.get_mut(&team) {
            record.credit_food(1);
        }
    }

    fn release_food(&mut self, carrier: EntityId, food: EntityId, position: Position) {
        if let Some(unit) = self.unit_mut(carrier) {
            unit.set_carrying(None);
        }
        if let Some(item) = self.food_mut(food) {
            item.release(position);
            self.index.place_food(food, position);
        }
    }

    fn spawn_unit(
        &mut self,
        headquarters: EntityId,
        id: EntityId,
        kind: UnitKind,
        position: Position,
        cost: u32,
    ) {
        let Some(team_id) = self.unit(headquarters).map(Unit::team) else {
            warn!(unit = %headquarters, "spawn from unknown headquarters");
            return;
        };
        let Some(team) = self.teams.get_mut(&team_id) else {
            return;
        };
        team.debit_food(cost);
        let stats = *team.settings().stats(kind);

        if let Err(error) = self.place_unit(Unit::new(id, team_id, kind, stats, position)) {
            warn!(unit = %id, %error, "spawned unit could not be placed");
        }
        self.next_entity_id = self.next_entity_id.max(id.get().saturating_add(1));
    }
}
