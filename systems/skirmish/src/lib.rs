#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic baseline strategy that gathers food, builds an army and
//! sends it at the nearest enemy.

use outpost_core::{Command, CommandKind, FighterKind, Position, UnitKind};
use outpost_world::{query::TeamView, Unit, WalkGrid};
use tracing::debug;

const BUILD_ORDER: [FighterKind; 3] = [
    FighterKind::Infantry,
    FighterKind::Ranged,
    FighterKind::Cavalry,
];

/// Producer of one team's commands for the upcoming turn.
///
/// Commands are only intents; the game re-validates every one of them.
pub trait Strategy {
    /// Commands for the team behind `view`.
    fn commands(&mut self, view: &TeamView<'_>) -> Vec<Command>;
}

/// Configuration parameters required to construct the skirmish strategy.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    citizen_target: u32,
}

impl Config {
    /// Creates a configuration that keeps `citizen_target` citizens alive
    /// before spending food on fighters.
    #[must_use]
    pub const fn new(citizen_target: u32) -> Self {
        Self { citizen_target }
    }

    /// Citizens the strategy keeps before building fighters.
    #[must_use]
    pub const fn citizen_target(&self) -> u32 {
        self.citizen_target
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Baseline strategy playing a gather-then-rush game.
#[derive(Debug)]
pub struct Skirmish {
    citizen_target: u32,
    build_cursor: usize,
}

impl Skirmish {
    /// Creates a new strategy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            citizen_target: config.citizen_target,
            build_cursor: 0,
        }
    }

    fn headquarters_command(
        &mut self,
        view: &TeamView<'_>,
        headquarters: &Unit,
    ) -> Option<Command> {
        let in_range = view
            .enemies()
            .filter(|enemy| headquarters.distance_to(enemy) <= headquarters.stats().range)
            .min_by_key(|enemy| (headquarters.distance_to(enemy), enemy.id()));
        if let Some(enemy) = in_range {
            return Some(Command::new(
                headquarters.id(),
                CommandKind::Attack { target: enemy.id() },
            ));
        }

        if !view.has_room() {
            return None;
        }

        let citizens = view.citizens().count();
        if citizens < usize::try_from(self.citizen_target).unwrap_or(usize::MAX) {
            return view.can_afford(UnitKind::Citizen).then(|| {
                Command::new(
                    headquarters.id(),
                    CommandKind::SpawnCitizen { position: None },
                )
            });
        }

        let kind = BUILD_ORDER[self.build_cursor % BUILD_ORDER.len()];
        if !view.can_afford(UnitKind::Fighter(kind)) {
            return None;
        }
        self.build_cursor += 1;
        Some(Command::new(
            headquarters.id(),
            CommandKind::SpawnFighter {
                kind,
                position: None,
            },
        ))
    }
}

impl Default for Skirmish {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Strategy for Skirmish {
    fn commands(&mut self, view: &TeamView<'_>) -> Vec<Command> {
        let mut commands = Vec::new();
        let Some(headquarters) = view.headquarters() else {
            return commands;
        };
        let grid = view.grid();

        if let Some(command) = self.headquarters_command(view, headquarters) {
            commands.push(command);
        }

        for citizen in view.citizens() {
            let command = match citizen.carrying() {
                Some(_) => return_food(view, &grid, headquarters, citizen),
                None => gather_food(view, &grid, citizen),
            };
            commands.extend(command);
        }

        for fighter in view.fighters() {
            let nearest = view
                .enemies()
                .min_by_key(|enemy| (fighter.distance_to(enemy), enemy.id()));
            if let Some(enemy) = nearest {
                commands.push(Command::new(
                    fighter.id(),
                    CommandKind::Attack { target: enemy.id() },
                ));
            }
        }

        debug!(
            team = %view.team_id(),
            turn = view.turn(),
            commands = commands.len(),
            "skirmish planned turn"
        );
        commands
    }
}

fn return_food(
    view: &TeamView<'_>,
    grid: &WalkGrid,
    headquarters: &Unit,
    citizen: &Unit,
) -> Option<Command> {
    let footprint = headquarters.footprint();
    let anchor = headquarters.position();

    if footprint.distance_to(anchor, citizen.position()) == 1 {
        let position = citizen
            .position()
            .adjacents()
            .into_iter()
            .find(|cell| footprint.contains(anchor, *cell))?;
        return Some(Command::new(
            citizen.id(),
            CommandKind::DropOffFood { position },
        ));
    }

    let ring: Vec<Position> = footprint
        .ring(anchor)
        .into_iter()
        .filter(|cell| view.is_free(*cell))
        .collect();
    let destination = step_toward(view, grid, citizen, &ring)?;
    Some(Command::new(
        citizen.id(),
        CommandKind::Move {
            destination,
            auto_pick_up_food: false,
            auto_drop_off_food: true,
        },
    ))
}

fn gather_food(view: &TeamView<'_>, grid: &WalkGrid, citizen: &Unit) -> Option<Command> {
    let game = view.game();
    let adjacent = citizen
        .position()
        .adjacents()
        .into_iter()
        .find_map(|cell| game.loose_food_at(cell));
    if let Some(food) = adjacent {
        return Some(Command::new(
            citizen.id(),
            CommandKind::PickUpFood { food: food.id() },
        ));
    }

    let targets: Vec<Position> = view
        .loose_food()
        .map(|food| food.position())
        .filter(|cell| view.is_free(*cell))
        .collect();
    let destination = step_toward(view, grid, citizen, &targets)?;
    Some(Command::new(
        citizen.id(),
        CommandKind::Move {
            destination,
            auto_pick_up_food: true,
            auto_drop_off_food: false,
        },
    ))
}

/// Furthest free cell the unit can reach this turn along the shortest path
/// to any of `goals`.
fn step_toward(
    view: &TeamView<'_>,
    grid: &WalkGrid,
    unit: &Unit,
    goals: &[Position],
) -> Option<Position> {
    let path = grid.shortest_path(unit.position(), goals)?;
    let speed = usize::try_from(unit.stats().speed).unwrap_or(usize::MAX);
    let reach = speed.min(path.len().saturating_sub(1));
    path.get(1..=reach)?
        .iter()
        .rev()
        .copied()
        .find(|cell| view.is_free(*cell))
}
