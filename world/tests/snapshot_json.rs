use outpost_core::{Command, CommandKind, FighterKind, Position, UnitKind};
use outpost_world::{
    config::GameConfig,
    generation::{generate, HOME_TEAM},
    snapshot::Snapshot,
    Game,
};

#[test]
fn snapshot_survives_json_after_play() {
    let mut game = generate(&GameConfig::default()).expect("valid config");
    let headquarters = game.headquarters(HOME_TEAM).expect("home stands").id();
    let citizen = game.citizens(HOME_TEAM).next().expect("starting citizen").id();
    let _ = game
        .execute_turn(&[
            Command::new(
                headquarters,
                CommandKind::SpawnFighter {
                    kind: FighterKind::Ranged,
                    position: None,
                },
            ),
            Command::new(
                citizen,
                CommandKind::Move {
                    destination: Position::new(2, 0),
                    auto_pick_up_food: true,
                    auto_drop_off_food: false,
                },
            ),
        ])
        .expect("game is running");

    let json = serde_json::to_string_pretty(&game.snapshot()).expect("serialize");
    let parsed: Snapshot = serde_json::from_str(&json).expect("deserialize");
    let restored = Game::from_snapshot(&parsed).expect("restorable snapshot");

    assert_eq!(restored.snapshot(), game.snapshot());
    assert_eq!(restored.fighters(HOME_TEAM).count(), 1);
    assert_eq!(
        restored.fighters(HOME_TEAM).map(|unit| unit.kind()).next(),
        Some(UnitKind::Fighter(FighterKind::Ranged))
    );
    assert_eq!(restored.history().actions(1).len(), 2);
}

#[test]
fn snapshot_uses_camel_case_keys() {
    let game = generate(&GameConfig::default()).expect("valid config");

    let value = serde_json::to_value(game.snapshot()).expect("serialize");

    assert!(value.get("maxTurns").is_some());
    assert!(value.get("nextEntityId").is_some());
    assert_eq!(
        value["teams"][0]["foodCount"],
        serde_json::json!(GameConfig::default().starting_food)
    );
    assert!(value["foods"][0].get("eatenBy").is_some());
}
