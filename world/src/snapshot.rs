//! Serialisable image of a [`Game`] used for persistence and replica sync.

use std::collections::HashSet;

use outpost_core::{EntityId, FighterKind, Position, TeamId, UnitKind, UnitSettings};
use serde::{Deserialize, Serialize};

use crate::{
    config::MAX_BOARD_SIDE, entity::Food, Game, History, PlacementError, SnapshotError, Team,
    Unit,
};

/// Complete game state in a serde-friendly layout.
///
/// Entity lists are ordered by id, so two games in the same state always
/// produce identical snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Number of resolved turns.
    pub turn: u32,
    /// Turn limit.
    pub max_turns: u32,
    /// Population cap per team.
    pub max_pop: u32,
    /// Identifier the next created entity receives.
    pub next_entity_id: u32,
    /// Walls.
    pub walls: Vec<WallRecord>,
    /// Food items, loose or carried.
    pub foods: Vec<FoodRecord>,
    /// Teams with their headquarters.
    pub teams: Vec<TeamRecord>,
    /// Citizens of every team.
    pub citizens: Vec<CitizenRecord>,
    /// Fighters of every team, tagged with their kind.
    pub fighters: Vec<FighterRecord>,
    /// Every resolved turn.
    #[serde(default)]
    pub history: History,
}

/// Serialised wall.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRecord {
    /// Identifier of the wall.
    pub id: EntityId,
    /// Cell the wall occupies.
    pub position: Position,
}

/// Serialised food item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    /// Identifier of the food.
    pub id: EntityId,
    /// Cell the food lies on or is carried across.
    pub position: Position,
    /// Carrier, when the food is carried.
    #[serde(default)]
    pub eaten_by: Option<EntityId>,
}

/// Serialised team including its headquarters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    /// Identifier of the team.
    pub id: TeamId,
    /// Display colour.
    pub color: String,
    /// Food stockpile.
    pub food_count: u32,
    /// The team's headquarters; hp at or below zero marks it destroyed.
    pub headquarters: HeadquartersRecord,
    /// Per-kind unit constants.
    #[serde(default)]
    pub settings: UnitSettings,
}

/// Serialised headquarters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadquartersRecord {
    /// Identifier of the headquarters.
    pub id: EntityId,
    /// Anchor cell.
    pub position: Position,
    /// Remaining hit points.
    pub hp: i64,
}

/// Serialised citizen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenRecord {
    /// Identifier of the citizen.
    pub id: EntityId,
    /// Owning team.
    pub team: TeamId,
    /// Remaining hit points.
    pub hp: i64,
    /// Cell the citizen stands on.
    pub position: Position,
    /// Carried food.
    #[serde(default)]
    pub carrying: Option<EntityId>,
}

/// Serialised fighter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterRecord {
    /// Identifier of the fighter.
    pub id: EntityId,
    /// Owning team.
    pub team: TeamId,
    /// Fighter archetype.
    pub kind: FighterKind,
    /// Remaining hit points.
    pub hp: i64,
    /// Cell the fighter stands on.
    pub position: Position,
}

fn placed(id: EntityId) -> impl FnOnce(PlacementError) -> SnapshotError {
    move |source| SnapshotError::Placement { id, source }
}

impl Game {
    /// Captures the complete state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let teams = self
            .teams()
            .map(|team| TeamRecord {
                id: team.id(),
                color: team.color().to_owned(),
                food_count: team.food_count(),
                headquarters: HeadquartersRecord {
                    id: team.headquarters(),
                    position: team.headquarters_position(),
                    hp: self.unit(team.headquarters()).map_or(0, Unit::hp),
                },
                settings: *team.settings(),
            })
            .collect();

        let mut citizens = Vec::new();
        let mut fighters = Vec::new();
        for unit in self.units() {
            match unit.kind() {
                UnitKind::Citizen => citizens.push(CitizenRecord {
                    id: unit.id(),
                    team: unit.team(),
                    hp: unit.hp(),
                    position: unit.position(),
                    carrying: unit.carrying(),
                }),
                UnitKind::Fighter(kind) => fighters.push(FighterRecord {
                    id: unit.id(),
                    team: unit.team(),
                    kind,
                    hp: unit.hp(),
                    position: unit.position(),
                }),
                UnitKind::Headquarters => {}
            }
        }

        Snapshot {
            width: self.width,
            height: self.height,
            turn: self.turn,
            max_turns: self.max_turns,
            max_pop: self.max_pop,
            next_entity_id: self.next_entity_id,
            walls: self
                .walls()
                .map(|wall| WallRecord {
                    id: wall.id(),
                    position: wall.position(),
                })
                .collect(),
            foods: self
                .foods()
                .map(|food| FoodRecord {
                    id: food.id(),
                    position: food.position(),
                    eaten_by: food.eaten_by(),
                })
                .collect(),
            teams,
            citizens,
            fighters,
            history: self.history.clone(),
        }
    }

    /// Rebuilds a game from a snapshot, re-deriving the spatial index and
    /// the path finder.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, SnapshotError> {
        if snapshot.width > MAX_BOARD_SIDE || snapshot.height > MAX_BOARD_SIDE {
            return Err(SnapshotError::BoardTooLarge {
                width: snapshot.width,
                height: snapshot.height,
            });
        }
        let mut game = Game::new(
            snapshot.width,
            snapshot.height,
            snapshot.max_turns,
            snapshot.max_pop,
        );
        game.turn = snapshot.turn;
        game.history = snapshot.history.clone();

        let mut ids = HashSet::new();
        let mut claim = |id: EntityId| {
            if ids.insert(id) {
                Ok(())
            } else {
                Err(SnapshotError::DuplicateId(id))
            }
        };

        for wall in &snapshot.walls {
            claim(wall.id)?;
            game.place_wall(wall.id, wall.position)
                .map_err(placed(wall.id))?;
        }

        for record in &snapshot.teams {
            let headquarters = record.headquarters.id;
            claim(headquarters)?;
            if record.headquarters.hp > 0 {
                let unit = Unit::new(
                    headquarters,
                    record.id,
                    UnitKind::Headquarters,
                    *record.settings.stats(UnitKind::Headquarters),
                    record.headquarters.position,
                )
                .with_hp(record.headquarters.hp);
                game.place_unit(unit).map_err(placed(headquarters))?;
            }
            let _ = game.teams.insert(
                record.id,
                Team::new(
                    record.id,
                    record.color.clone(),
                    record.food_count,
                    headquarters,
                    record.headquarters.position,
                    record.settings,
                ),
            );
        }

        let units = snapshot
            .citizens
            .iter()
            .map(|citizen| {
                (
                    citizen.id,
                    citizen.team,
                    UnitKind::Citizen,
                    citizen.hp,
                    citizen.position,
                    citizen.carrying,
                )
            })
            .chain(snapshot.fighters.iter().map(|fighter| {
                (
                    fighter.id,
                    fighter.team,
                    UnitKind::Fighter(fighter.kind),
                    fighter.hp,
                    fighter.position,
                    None,
                )
            }));
        for (id, team, kind, hp, position, carrying) in units {
            claim(id)?;
            if hp <= 0 {
                return Err(SnapshotError::DeadUnit(id));
            }
            let stats = *game
                .team(team)
                .ok_or(SnapshotError::UnknownTeam { unit: id, team })?
                .settings()
                .stats(kind);
            let mut unit = Unit::new(id, team, kind, stats, position).with_hp(hp);
            unit.set_carrying(carrying);
            game.place_unit(unit).map_err(placed(id))?;
        }

        for record in &snapshot.foods {
            claim(record.id)?;
            let mut food = Food::new(record.id, record.position);
            if let Some(carrier) = record.eaten_by {
                let carried = game.unit(carrier).map_or(false, |unit| {
                    unit.carrying() == Some(record.id) && unit.position() == record.position
                });
                if !carried {
                    return Err(SnapshotError::CarryMismatch {
                        food: record.id,
                        carrier,
                    });
                }
                food.attach(carrier, record.position);
            }
            game.place_food(food).map_err(placed(record.id))?;
        }

        for citizen in &snapshot.citizens {
            if let Some(food) = citizen.carrying {
                if game.food(food).and_then(Food::eaten_by) != Some(citizen.id) {
                    return Err(SnapshotError::CarryMismatch {
                        food,
                        carrier: citizen.id,
                    });
                }
            }
        }

        if ids.iter().any(|id| id.get() >= snapshot.next_entity_id) {
            return Err(SnapshotError::StaleNextId(snapshot.next_entity_id));
        }
        game.next_entity_id = snapshot.next_entity_id;
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        let mut game = Game::new(6, 6, 20, 10);
        let _ = game
            .add_team(TeamId::new(1), "#3b82f6", 4, UnitSettings::default(), Position::new(0, 0))
            .expect("fits");
        let _ = game
            .add_team(TeamId::new(2), "#ef4444", 4, UnitSettings::default(), Position::new(4, 4))
            .expect("fits");
        let _ = game.add_wall(Position::new(3, 0)).expect("fits");
        let _ = game.add_food(Position::new(2, 3)).expect("fits");
        let _ = game
            .add_unit(TeamId::new(1), UnitKind::Citizen, Position::new(2, 2))
            .expect("fits");
        let _ = game
            .add_unit(
                TeamId::new(2),
                UnitKind::Fighter(FighterKind::Infantry),
                Position::new(3, 4),
            )
            .expect("fits");
        game
    }

    #[test]
    fn snapshot_rebuilds_identical_game() {
        let original = game();
        let snapshot = original.snapshot();

        let restored = Game::from_snapshot(&snapshot).expect("valid snapshot");

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.occupied_cells(), original.occupied_cells());
        assert_eq!(restored.team_grid(TeamId::new(1)), original.team_grid(TeamId::new(1)));
        assert_eq!(snapshot.citizens.len(), 1);
        assert_eq!(snapshot.fighters[0].kind, FighterKind::Infantry);
    }

    #[test]
    fn overlapping_entities_are_rejected() {
        let mut snapshot = game().snapshot();
        let wall = snapshot.walls[0].clone();
        snapshot.walls.push(WallRecord {
            id: EntityId::new(99),
            position: wall.position,
        });
        snapshot.next_entity_id = 100;

        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::Placement {
                id: EntityId::new(99),
                source: PlacementError::Occupied(wall.position),
            })
        );
    }

    #[test]
    fn duplicate_ids_and_stale_counters_are_rejected() {
        let mut snapshot = game().snapshot();
        snapshot.next_entity_id = 2;
        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::StaleNextId(2))
        );

        let mut snapshot = game().snapshot();
        let mut duplicate = snapshot.walls[0].clone();
        duplicate.position = Position::new(5, 0);
        snapshot.walls.push(duplicate.clone());
        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::DuplicateId(duplicate.id))
        );
    }

    #[test]
    fn carried_food_must_agree_with_carrier() {
        let mut snapshot = game().snapshot();
        snapshot.foods[0].eaten_by = Some(snapshot.citizens[0].id);

        assert!(matches!(
            Game::from_snapshot(&snapshot),
            Err(SnapshotError::CarryMismatch { .. })
        ));
    }

    #[test]
    fn carried_food_travels_with_its_carrier() {
        let mut snapshot = game().snapshot();
        let citizen = snapshot.citizens[0].id;
        snapshot.citizens[0].carrying = Some(snapshot.foods[0].id);
        snapshot.foods[0].eaten_by = Some(citizen);
        snapshot.foods[0].position = snapshot.citizens[0].position;

        let restored = Game::from_snapshot(&snapshot).expect("carrier and food agree");
        assert!(restored.loose_food_cells().is_empty());
        assert_eq!(
            restored.food(snapshot.foods[0].id).and_then(Food::eaten_by),
            Some(citizen)
        );

        snapshot.foods[0].position = Position::new(5, 5);
        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::CarryMismatch {
                food: snapshot.foods[0].id,
                carrier: citizen,
            })
        );
    }

    #[test]
    fn dead_units_are_rejected() {
        let mut snapshot = game().snapshot();
        snapshot.max_pop = 1;
        snapshot.citizens[0].hp = 0;
        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::DeadUnit(snapshot.citizens[0].id))
        );

        let mut snapshot = game().snapshot();
        snapshot.fighters[0].hp = -4;
        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::DeadUnit(snapshot.fighters[0].id))
        );
    }

    #[test]
    fn oversized_boards_are_rejected() {
        let mut snapshot = game().snapshot();
        snapshot.width = 4_000_000_000;
        snapshot.height = 4_000_000_000;

        assert_eq!(
            Game::from_snapshot(&snapshot).map(|_| ()),
            Err(SnapshotError::BoardTooLarge {
                width: 4_000_000_000,
                height: 4_000_000_000,
            })
        );
    }
}
