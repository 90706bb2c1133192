//! Seeded board generation.
//!
//! Boards are point-symmetric around the centre: every wall or food item
//! placed for one side has a twin at the mirrored cell, and the second
//! headquarters mirrors the first.

use std::collections::HashSet;

use outpost_core::{Position, TeamId, UnitKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    config::{ConfigError, GameConfig},
    Game, PathFinder,
};

/// Team whose headquarters sits near the top-left corner.
pub const HOME_TEAM: TeamId = TeamId::new(1);
/// Team whose headquarters mirrors the home team's.
pub const AWAY_TEAM: TeamId = TeamId::new(2);

const HOME_COLOR: &str = "#3b82f6";
const AWAY_COLOR: &str = "#ef4444";
const ATTEMPTS_PER_CELL: u32 = 4;

#[derive(Clone, Copy, Debug)]
struct Mirror {
    width: i32,
    height: i32,
}

impl Mirror {
    fn cell(self, cell: Position) -> Position {
        Position::new(self.width - 1 - cell.x(), self.height - 1 - cell.y())
    }
}

/// Builds the starting board described by `config`.
///
/// The same configuration always yields the same board. Walls never cut the
/// two headquarters off from each other and nothing is placed on a
/// headquarters or the cells around it.
pub fn generate(config: &GameConfig) -> Result<Game, ConfigError> {
    config.validate()?;

    let columns = i32::try_from(config.width).unwrap_or(i32::MAX);
    let rows = i32::try_from(config.height).unwrap_or(i32::MAX);
    let mirror = Mirror {
        width: columns,
        height: rows,
    };
    let footprint = UnitKind::Headquarters.footprint();
    let home_anchor = Position::new(1, 1);
    let away_anchor = mirror.cell(home_anchor.offset(
        i32::try_from(footprint.width()).unwrap_or(1) - 1,
        i32::try_from(footprint.height()).unwrap_or(1) - 1,
    ));

    let mut game = Game::new(config.width, config.height, config.max_turns, config.max_pop);
    let _ = game.add_team(
        HOME_TEAM,
        HOME_COLOR,
        config.starting_food,
        config.units,
        home_anchor,
    )?;
    let _ = game.add_team(
        AWAY_TEAM,
        AWAY_COLOR,
        config.starting_food,
        config.units,
        away_anchor,
    )?;

    let home_ring = footprint.ring(home_anchor);
    let mut reserved: HashSet<Position> = HashSet::new();
    for cell in footprint.covering(home_anchor).into_iter().chain(home_ring.iter().copied()) {
        let _ = reserved.insert(cell);
        let _ = reserved.insert(mirror.cell(cell));
    }

    let citizens = usize::try_from(config.starting_citizens).unwrap_or(usize::MAX);
    for cell in home_ring.iter().take(citizens) {
        let _ = game.add_unit(HOME_TEAM, UnitKind::Citizen, *cell)?;
        let _ = game.add_unit(AWAY_TEAM, UnitKind::Citizen, mirror.cell(*cell))?;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let attempts = config.width.saturating_mul(config.height).saturating_mul(ATTEMPTS_PER_CELL);
    let mut probe = PathFinder::new(config.width, config.height);

    let wall_pairs = config.wall_count / 2;
    let mut walls = 0;
    for _ in 0..attempts {
        if walls >= wall_pairs {
            break;
        }
        let cell = Position::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
        let twin = mirror.cell(cell);
        if cell == twin
            || reserved.contains(&cell)
            || reserved.contains(&twin)
            || probe.is_blocked(cell)
            || probe.is_blocked(twin)
        {
            continue;
        }

        probe.block_position(cell);
        probe.block_position(twin);
        if probe.grid().path(home_anchor, away_anchor).is_none() {
            probe.clear_position(cell);
            probe.clear_position(twin);
            continue;
        }

        let _ = game.add_wall(cell)?;
        let _ = game.add_wall(twin)?;
        walls += 1;
    }

    let food_pairs = config.food_count / 2;
    let mut foods = 0;
    for _ in 0..attempts {
        if foods >= food_pairs {
            break;
        }
        let cell = Position::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
        let twin = mirror.cell(cell);
        if cell == twin
            || reserved.contains(&cell)
            || reserved.contains(&twin)
            || game.occupant(cell).is_some()
            || game.occupant(twin).is_some()
            || game.loose_food_at(cell).is_some()
            || game.loose_food_at(twin).is_some()
        {
            continue;
        }

        let _ = game.add_food(cell)?;
        let _ = game.add_food(twin)?;
        foods += 1;
    }

    debug!(
        seed = config.seed,
        walls = walls * 2,
        foods = foods * 2,
        "generated board"
    );
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_builds_same_board() {
        let config = GameConfig::default();

        let first = generate(&config).expect("valid config");
        let second = generate(&config).expect("valid config");

        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn different_seeds_build_different_boards() {
        let first = generate(&GameConfig::default()).expect("valid config");
        let second = generate(&GameConfig {
            seed: 1,
            ..GameConfig::default()
        })
        .expect("valid config");

        assert_ne!(first.snapshot().walls, second.snapshot().walls);
    }

    #[test]
    fn board_is_point_symmetric() {
        let config = GameConfig::default();
        let game = generate(&config).expect("valid config");
        let mirror = Mirror {
            width: 20,
            height: 20,
        };

        let walls: HashSet<Position> = game.walls().map(|wall| wall.position()).collect();
        assert_eq!(walls.len(), 24);
        assert!(walls.iter().all(|cell| walls.contains(&mirror.cell(*cell))));

        let foods: HashSet<Position> = game.foods().map(|food| food.position()).collect();
        assert_eq!(foods.len(), 16);
        assert!(foods.iter().all(|cell| foods.contains(&mirror.cell(*cell))));

        assert_eq!(game.citizens(HOME_TEAM).count(), 2);
        assert_eq!(game.citizens(AWAY_TEAM).count(), 2);
        assert_eq!(
            game.headquarters(AWAY_TEAM).map(|unit| unit.position()),
            Some(Position::new(17, 17))
        );
    }

    #[test]
    fn headquarters_stay_connected() {
        let config = GameConfig {
            width: 10,
            height: 10,
            wall_count: 60,
            food_count: 0,
            ..GameConfig::default()
        };
        let game = generate(&config).expect("valid config");

        let home = game.headquarters(HOME_TEAM).expect("home stands").position();
        let away = game.headquarters(AWAY_TEAM).expect("away stands").position();
        let unit_cells: Vec<Position> = game.units().flat_map(|unit| unit.covering()).collect();
        let grid = game.pathfinder().grid_for_team(&unit_cells);

        assert!(grid.path(home, away).is_some());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            width: 4,
            ..GameConfig::default()
        };
        assert!(matches!(
            generate(&config),
            Err(ConfigError::BoardTooSmall { .. })
        ));
    }
}
