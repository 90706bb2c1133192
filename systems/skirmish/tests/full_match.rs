use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use outpost_core::{Action, Effect};
use outpost_system_skirmish::{Config, Skirmish, Strategy};
use outpost_world::{
    config::GameConfig,
    generation::{generate, AWAY_TEAM, HOME_TEAM},
    query::team_view,
    Game,
};

#[test]
fn full_match_keeps_replica_in_lock_step() {
    let mut game = generate(&config()).expect("valid config");
    let mut replica = Game::from_snapshot(&game.snapshot()).expect("restorable snapshot");
    let mut home = Skirmish::new(Config::new(3));
    let mut away = Skirmish::new(Config::new(3));
    let mut deposits = 0;
    let mut spawns = 0;

    while !game.is_over() {
        let mut commands = home.commands(&team_view(&game, HOME_TEAM));
        commands.extend(away.commands(&team_view(&game, AWAY_TEAM)));
        let actions = game.execute_turn(&commands).expect("game is running");

        deposits += actions
            .iter()
            .filter(|action| is_deposit(action))
            .count();
        spawns += actions
            .iter()
            .filter(|action| matches!(action.effect(), Some(Effect::Spawn { .. })))
            .count();

        replica
            .import_turn(game.turn(), actions)
            .expect("turns arrive in order");
        assert_eq!(
            fingerprint(&replica),
            fingerprint(&game),
            "replica diverged at turn {}",
            game.turn()
        );
    }

    assert!(replica.is_over());
    assert_eq!(replica.winner(), game.winner());
    assert!(deposits > 0, "citizens never brought food home");
    assert!(spawns > 0, "headquarters never spawned");
}

#[test]
fn same_seed_plays_the_same_match() {
    let first = play(config());
    let second = play(config());

    assert_eq!(first, second, "match diverged between runs");
}

fn config() -> GameConfig {
    GameConfig {
        width: 16,
        height: 16,
        max_turns: 150,
        starting_food: 6,
        seed: 0x5eed,
        ..GameConfig::default()
    }
}

fn play(config: GameConfig) -> (u64, Vec<Action>) {
    let mut game = generate(&config).expect("valid config");
    let mut home = Skirmish::default();
    let mut away = Skirmish::default();
    let mut log = Vec::new();

    loop {
        let mut commands = home.commands(&team_view(&game, HOME_TEAM));
        commands.extend(away.commands(&team_view(&game, AWAY_TEAM)));
        match game.execute_turn(&commands) {
            Some(actions) => log.extend(actions),
            None => break,
        }
    }

    (fingerprint(&game), log)
}

fn is_deposit(action: &Action) -> bool {
    matches!(
        action.effect(),
        Some(Effect::Move {
            deposited_food: Some(_),
            ..
        }) | Some(Effect::DropOffFood {
            deposited: true,
            ..
        })
    )
}

fn fingerprint(game: &Game) -> u64 {
    let mut hasher = DefaultHasher::new();
    serde_json::to_string(&game.snapshot())
        .expect("snapshot serializes")
        .hash(&mut hasher);
    hasher.finish()
}
