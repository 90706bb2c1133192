//! Read-only views handed to command producers.

use outpost_core::{EntityId, Position, TeamId, UnitKind};
use serde::{Deserialize, Serialize};

use crate::{snapshot::Snapshot, Food, Game, Team, Unit, WalkGrid};

/// Borrowed view of the game from one team's perspective.
#[derive(Clone, Copy, Debug)]
pub struct TeamView<'a> {
    game: &'a Game,
    team: TeamId,
}

/// Captures a read-only view for `team`.
#[must_use]
pub fn team_view(game: &Game, team: TeamId) -> TeamView<'_> {
    TeamView { game, team }
}

impl<'a> TeamView<'a> {
    /// Team the view belongs to.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team
    }

    /// Full game behind the view.
    #[must_use]
    pub const fn game(&self) -> &'a Game {
        self.game
    }

    /// The team record.
    #[must_use]
    pub fn team(&self) -> Option<&'a Team> {
        self.game.team(self.team)
    }

    /// Current turn.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.game.turn()
    }

    /// Food the team can spend.
    #[must_use]
    pub fn food_count(&self) -> u32 {
        self.team().map_or(0, Team::food_count)
    }

    /// Reports whether the team could pay for a unit of `kind`.
    #[must_use]
    pub fn can_afford(&self, kind: UnitKind) -> bool {
        self.team()
            .map_or(false, |team| team.settings().stats(kind).cost <= team.food_count())
    }

    /// Reports whether the team is below the population cap.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.game.population(self.team) < self.game.max_pop()
    }

    /// The team's standing headquarters.
    #[must_use]
    pub fn headquarters(&self) -> Option<&'a Unit> {
        self.game.headquarters(self.team)
    }

    /// The team's citizens in id order.
    pub fn citizens(&self) -> impl Iterator<Item = &'a Unit> + 'a {
        self.game.citizens(self.team)
    }

    /// The team's fighters in id order.
    pub fn fighters(&self) -> impl Iterator<Item = &'a Unit> + 'a {
        self.game.fighters(self.team)
    }

    /// Every unit of other teams in id order, headquarters included.
    pub fn enemies(&self) -> impl Iterator<Item = &'a Unit> + 'a {
        let team = self.team;
        self.game.units().filter(move |unit| unit.team() != team)
    }

    /// Food lying on the ground in id order.
    pub fn loose_food(&self) -> impl Iterator<Item = &'a Food> + 'a {
        self.game.foods().filter(|food| food.is_loose())
    }

    /// Reports whether a unit could stand on `cell`.
    #[must_use]
    pub fn is_free(&self, cell: Position) -> bool {
        self.game.in_bounds(cell) && self.game.occupant(cell).is_none()
    }

    /// The team-relative walkability grid.
    #[must_use]
    pub fn grid(&self) -> WalkGrid {
        self.game.team_grid(self.team)
    }

    /// Shortest path for one of the team's units.
    #[must_use]
    pub fn path(&self, unit: EntityId, destination: Position) -> Option<Vec<Position>> {
        self.game.get_path(unit, destination)
    }

    /// Serialisable copy of the view for out-of-process producers.
    #[must_use]
    pub fn to_input(&self) -> StrategyInput {
        StrategyInput {
            team: self.team,
            game: self.game.snapshot(),
        }
    }
}

/// Game state plus the team a producer plays for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInput {
    /// Team the commands are expected for.
    pub team: TeamId,
    /// Complete game state.
    pub game: Snapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{FighterKind, UnitSettings};

    #[test]
    fn view_splits_own_units_from_enemies() {
        let mut game = Game::new(10, 10, 10, 3);
        let home = TeamId::new(1);
        let away = TeamId::new(2);
        let _ = game
            .add_team(home, "#3b82f6", 2, UnitSettings::default(), Position::new(0, 0))
            .expect("fits");
        let _ = game
            .add_team(away, "#ef4444", 0, UnitSettings::default(), Position::new(8, 8))
            .expect("fits");
        let citizen = game
            .add_unit(home, UnitKind::Citizen, Position::new(3, 3))
            .expect("fits");
        let raider = game
            .add_unit(away, UnitKind::Fighter(FighterKind::Cavalry), Position::new(5, 5))
            .expect("fits");
        let _ = game.add_food(Position::new(4, 4)).expect("fits");

        let view = team_view(&game, home);

        assert_eq!(view.citizens().map(Unit::id).collect::<Vec<_>>(), vec![citizen]);
        assert_eq!(view.enemies().count(), 2);
        assert!(view.enemies().any(|unit| unit.id() == raider));
        assert_eq!(view.loose_food().count(), 1);
        assert!(view.can_afford(UnitKind::Fighter(FighterKind::Infantry)));
        assert!(!view.can_afford(UnitKind::Fighter(FighterKind::Cavalry)));
        assert!(view.has_room());
        assert!(!view.is_free(Position::new(1, 1)));
        assert_eq!(view.path(citizen, Position::new(3, 5)).map(|path| path.len()), Some(3));
    }

    #[test]
    fn strategy_input_round_trips_through_json() {
        let mut game = Game::new(8, 8, 10, 3);
        let _ = game
            .add_team(TeamId::new(1), "#3b82f6", 2, UnitSettings::default(), Position::new(0, 0))
            .expect("fits");

        let input = team_view(&game, TeamId::new(1)).to_input();
        let json = serde_json::to_string(&input).expect("serialize");
        let restored: StrategyInput = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, input);
        assert_eq!(restored.game.teams[0].headquarters.hp, 500);
    }
}
